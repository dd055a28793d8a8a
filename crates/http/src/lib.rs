//! An asynchronous HTTP/1.x connection core
//!
//! This crate terminates TCP connections and parses HTTP/1.0 and HTTP/1.1 requests
//! incrementally, straight off the wire. Nothing waits for the whole message: headers
//! are parsed as soon as the blank line arrives, the handler is dispatched right away,
//! and the body keeps streaming into the request while the handler runs.
//!
//! # Features
//!
//! - HTTP/1.0 and HTTP/1.1 requests
//! - Asynchronous I/O using tokio
//! - Environ-style request model (`REQUEST_METHOD`, `PATH_INFO`, `HTTP_*` ...)
//! - Streaming request bodies with a completion future and progress reporting
//! - Per-phase timeouts: first request, request, keep-alive
//! - Keep-alive connections
//! - Expect-continue mechanism
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use http::StatusCode;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use trellis_http::connection::{ConnectionConfig, HttpConnection};
//! use trellis_http::handler::make_handler;
//! use trellis_http::protocol::{Environ, EnvironTemplate, Response};
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         let template = Arc::new(EnvironTemplate::new("127.0.0.1", "8080").with_remote_addr(remote_addr.ip().to_string()));
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer, template, ConnectionConfig::default());
//!             if let Err(e) = connection.process(handler).await {
//!                 error!("service has error, cause {}, connection shutdown", e);
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(environ: Environ) -> Result<Response, Infallible> {
//!     info!(path = environ.path_info(), "request path");
//!     let body = "Hello World!\r\n";
//!     Ok(Response::new(StatusCode::OK).header("Content-Length", body.len().to_string()).body(body))
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`protocol`]: the environ model, responses, body handles and error types
//! - [`codec`]: request-line/header parsing, body framing and response serialization
//! - [`connection`]: the per-connection state machine
//! - [`handler`]: the dispatch contract between a connection and the application
//!
//! # Connection lifecycle
//!
//! [`connection::HttpConnection`] walks through
//! `AwaitingFirstBytes -> ReadingHeaders -> (ReadingBody)? -> Dispatched -> WritingResponse`,
//! then either `IdleKeepAlive` (and back to `ReadingHeaders`) or `Closed`. Exactly one
//! request is in flight per connection; pipelining is not supported.
//!
//! # Limitations
//!
//! - HTTP/1.x only (HTTP/2 or HTTP/3 is not supported)
//! - No TLS support (use a reverse proxy for HTTPS)
//! - No chunked transfer-encoding decoding
//! - Maximum request line: 2KB
//! - Maximum size of everything before the body: 64KB

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
