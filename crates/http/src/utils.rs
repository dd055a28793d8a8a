//! Utility macros and functions for the HTTP crate.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
///
/// ```ignore
/// ensure!(line.len() <= MAX_REQUEST_LINE, ParseError::request_line_too_long(line.len(), MAX_REQUEST_LINE));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
