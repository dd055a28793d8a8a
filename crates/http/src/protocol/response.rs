//! HTTP response model.
//!
//! A response is the three-part contract handlers fulfil: a status line
//! (`"<3-digit code> <reason phrase>"`), an ordered list of header name/value pairs that
//! is written verbatim, and a finite, possibly empty, sequence of body chunks.

use std::borrow::Cow;

use bytes::Bytes;
use http::{StatusCode, Version};

use crate::protocol::InvalidStatusLine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    reason: Cow<'static, str>,
    headers: Vec<(String, String)>,
    body: Vec<Bytes>,
}

/// The status line and headers of a response, bound to the version it is written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    version: Version,
    status: StatusCode,
    reason: Cow<'static, str>,
    headers: Vec<(String, String)>,
}

impl Response {
    /// A response with the canonical reason phrase of `status`, no headers and no body.
    pub fn new(status: StatusCode) -> Self {
        let reason = Cow::Borrowed(status.canonical_reason().unwrap_or("Unknown"));
        Self { status, reason, headers: Vec::new(), body: Vec::new() }
    }

    /// Parses a `"<3-digit code> <reason phrase>"` status line.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatusLine`] when the code is not three digits in 100..=999 or
    /// is not followed by a space.
    pub fn from_status_line(line: &str) -> Result<Self, InvalidStatusLine> {
        let invalid = || InvalidStatusLine { line: line.to_string() };

        let (code, reason) = line.split_once(' ').ok_or_else(invalid)?;
        if code.len() != 3 {
            return Err(invalid());
        }
        let status = StatusCode::from_bytes(code.as_bytes()).map_err(|_| invalid())?;

        Ok(Self { status, reason: Cow::Owned(reason.to_string()), headers: Vec::new(), body: Vec::new() })
    }

    /// Replaces the status, and the reason phrase with its canonical one.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.reason = Cow::Borrowed(status.canonical_reason().unwrap_or("Unknown"));
        self.status = status;
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends one body chunk.
    #[must_use]
    pub fn body(mut self, chunk: impl Into<Bytes>) -> Self {
        self.body.push(chunk.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn status_line(&self) -> String {
        format!("{} {}", self.status.as_str(), self.reason)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Vec<(String, String)> {
        &mut self.headers
    }

    /// The value of the first header named `name`, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    pub fn chunks(&self) -> &[Bytes] {
        &self.body
    }

    pub fn body_len(&self) -> usize {
        self.body.iter().map(Bytes::len).sum()
    }

    /// Splits the response into its head, written with `version`, and its body chunks.
    pub fn into_parts(self, version: Version) -> (ResponseHead, Vec<Bytes>) {
        let head = ResponseHead { version, status: self.status, reason: self.reason, headers: self.headers };
        (head, self.body)
    }
}

impl ResponseHead {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_reason() {
        let response = Response::new(StatusCode::REQUEST_TIMEOUT);
        assert_eq!(response.status_line(), "408 Request Timeout");
        assert!(response.headers().is_empty());
        assert!(response.chunks().is_empty());

        let response = response.with_status(StatusCode::CREATED);
        assert_eq!(response.status_line(), "201 Created");
    }

    #[test]
    fn parse_status_line() {
        let response = Response::from_status_line("200 OK").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.reason(), "OK");

        let response = Response::from_status_line("299 Custom Reason").unwrap();
        assert_eq!(response.status().as_u16(), 299);
        assert_eq!(response.status_line(), "299 Custom Reason");

        assert!(Response::from_status_line("20 OK").is_err());
        assert!(Response::from_status_line("OK 200").is_err());
        assert!(Response::from_status_line("200").is_err());
    }

    #[test]
    fn ordered_headers_and_chunks() {
        let response = Response::new(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .header("Set-Cookie", "a=1")
            .header("Set-Cookie", "b=2")
            .body("Hello, ")
            .body("World!");

        assert_eq!(response.header_value("content-type"), Some("text/plain"));
        assert_eq!(response.header_value("set-cookie"), Some("a=1"));
        assert_eq!(response.headers()[2], ("Set-Cookie".to_string(), "b=2".to_string()));
        assert_eq!(response.body_len(), 13);

        let (head, body) = response.into_parts(Version::HTTP_10);
        assert_eq!(head.version(), Version::HTTP_10);
        assert_eq!(head.headers().len(), 3);
        assert_eq!(body.len(), 2);
    }
}
