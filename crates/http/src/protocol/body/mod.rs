//! HTTP request body handling.
//!
//! A request body is streamed into the request while its handler already runs. The two
//! halves share one `tokio::sync::watch` channel:
//!
//! - [`BodySender`]: owned by the connection, appends every received chunk and marks
//!   completion exactly once
//! - [`RequestBody`]: owned by the [`Environ`](crate::protocol::Environ), lets the handler
//!   observe progress and suspend until the body is complete
//!
//! Completion is the only suspension point for a handler that needs the body: there is
//! no polling, the waiting handler is woken by the chunk that completes the body.

mod body_channel;
mod request_body;

pub use body_channel::BodySender;
pub use body_channel::body_channel;
pub use request_body::BodyProgress;
pub use request_body::RequestBody;
