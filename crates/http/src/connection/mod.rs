//! HTTP connection handling module
//!
//! This module implements the state machine serving one accepted stream.
//!
//! # Components
//!
//! - [`HttpConnection`]: drives the connection through its [`ConnectionState`]s:
//!   - Reads request heads and streams request bodies
//!   - Enforces the first-request, request and keep-alive timeouts
//!   - Implements expect-continue handling
//!   - Writes responses and decides between keep-alive and close, see [`should_close`]
//! - [`ConnectionConfig`]: timeouts and buffer sizes
//!
//! # Failure handling
//!
//! Every protocol failure ends in a synthetic response (400, 408, 414, 500, 505) followed
//! by a close, an idle timeout ends in a silent close.

mod config;
mod http_connection;
mod message_writer;
mod timeout;

pub use config::ConnectionConfig;
pub use http_connection::ConnectionState;
pub use http_connection::HttpConnection;
pub use http_connection::should_close;
