//! Converts handler return values into responses.
//!
//! The [`Responder`] trait lets a handler return whatever fits: a prebuilt
//! [`Response`], text, JSON, a status paired with a body, or a [`StatusError`]. Text
//! and JSON bodies get their `Content-Type` and `Content-Length` set.
//!
//! A responder that fails hands its error to the connection, which answers with
//! `500 Internal Server Error`.

use std::convert::Infallible;

use bytes::Bytes;
use http::{Method, StatusCode};
use thiserror::Error;
use trellis_http::protocol::Response;

use crate::handler::BoxError;

/// A type that can be turned into a response.
pub trait Responder {
    fn into_response(self) -> Result<Response, BoxError>;
}

fn with_body(status: StatusCode, content_type: &str, body: Bytes) -> Response {
    Response::new(status)
        .header("Content-Type", content_type)
        .header("Content-Length", body.len().to_string())
        .body(body)
}

impl Responder for Response {
    fn into_response(self) -> Result<Response, BoxError> {
        Ok(self)
    }
}

/// An empty `200 OK`.
impl Responder for () {
    fn into_response(self) -> Result<Response, BoxError> {
        Ok(Response::new(StatusCode::OK).header("Content-Length", "0"))
    }
}

impl Responder for &'static str {
    fn into_response(self) -> Result<Response, BoxError> {
        Ok(with_body(StatusCode::OK, mime::TEXT_PLAIN_UTF_8.as_ref(), Bytes::from_static(self.as_bytes())))
    }
}

impl Responder for String {
    fn into_response(self) -> Result<Response, BoxError> {
        Ok(with_body(StatusCode::OK, mime::TEXT_PLAIN_UTF_8.as_ref(), Bytes::from(self)))
    }
}

impl Responder for Bytes {
    fn into_response(self) -> Result<Response, BoxError> {
        Ok(with_body(StatusCode::OK, mime::APPLICATION_OCTET_STREAM.as_ref(), self))
    }
}

impl Responder for serde_json::Value {
    fn into_response(self) -> Result<Response, BoxError> {
        let body = serde_json::to_vec(&self)?;
        Ok(with_body(StatusCode::OK, mime::APPLICATION_JSON.as_ref(), Bytes::from(body)))
    }
}

/// Replaces the status of the inner response.
impl<T: Responder> Responder for (StatusCode, T) {
    fn into_response(self) -> Result<Response, BoxError> {
        let (status, responder) = self;
        Ok(responder.into_response()?.with_status(status))
    }
}

impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn into_response(self) -> Result<Response, BoxError> {
        match self {
            Ok(t) => t.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// `None` is a `404 Not Found`.
impl<T: Responder> Responder for Option<T> {
    fn into_response(self) -> Result<Response, BoxError> {
        match self {
            Some(t) => t.into_response(),
            None => StatusError::not_found().into_response(),
        }
    }
}

/// Fails the request; the connection answers `500 Internal Server Error`.
impl Responder for BoxError {
    fn into_response(self) -> Result<Response, BoxError> {
        Err(self)
    }
}

impl Responder for Infallible {
    fn into_response(self) -> Result<Response, BoxError> {
        match self {}
    }
}

/// An error status a handler answers with on purpose.
///
/// The body defaults to the status line, as plain text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}")]
pub struct StatusError {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl StatusError {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: Vec::new(), body: None }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    /// A `405 Method Not Allowed` whose `Allow` header lists `allowed`.
    pub fn method_not_allowed(allowed: &[Method]) -> Self {
        let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(",");
        Self::new(StatusCode::METHOD_NOT_ALLOWED).header("Allow", allow)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl Responder for StatusError {
    fn into_response(self) -> Result<Response, BoxError> {
        let body = self.body.unwrap_or_else(|| {
            let reason = self.status.canonical_reason().unwrap_or("Unknown");
            Bytes::from(format!("{} {}", self.status.as_str(), reason))
        });

        let mut response = with_body(self.status, mime::TEXT_PLAIN_UTF_8.as_ref(), body);
        response.headers_mut().extend(self.headers);
        Ok(response)
    }
}
