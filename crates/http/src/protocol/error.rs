use http::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Failures while reading a request off the wire.
///
/// Every variant except [`ParseError::Io`] is answered with a synthetic response,
/// see [`ParseError::status_code`].
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("request line too long, current: {current_size} exceed the limit {max_size}")]
    RequestLineTooLong { current_size: usize, max_size: usize },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("http version not supported: {version}")]
    UnsupportedVersion { version: String },

    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn request_line_too_long(current_size: usize, max_size: usize) -> Self {
        Self::RequestLineTooLong { current_size, max_size }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn unsupported_version<S: ToString>(version: S) -> Self {
        Self::UnsupportedVersion { version: version.to_string() }
    }

    pub fn bad_request<S: ToString>(str: S) -> Self {
        Self::BadRequest { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status of the synthetic response sent back for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ParseError::RequestLineTooLong { .. } | ParseError::TooLargeHeader { .. } => StatusCode::URI_TOO_LONG,
            ParseError::UnsupportedVersion { .. } => StatusCode::HTTP_VERSION_NOT_SUPPORTED,
            ParseError::BadRequest { .. } | ParseError::InvalidContentLength { .. } => StatusCode::BAD_REQUEST,
            ParseError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid response head: {reason}")]
    InvalidHead { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_head<S: ToString>(str: S) -> Self {
        Self::InvalidHead { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// The request body can no longer complete.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyError {
    #[error("request body aborted after {received} bytes")]
    Aborted { received: u64 },
}

/// A status line that is not `"<3-digit code> <reason phrase>"`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status line: {line:?}")]
pub struct InvalidStatusLine {
    pub line: String,
}
