//! Core HTTP protocol abstractions.
//!
//! This module provides the request and response model shared by the codec and the
//! connection layers:
//!
//! - **Message Handling** ([`message`]): Core message types and payload processing
//!   - [`Message`]: Represents either a head or payload chunks
//!   - [`PayloadItem`]: Handles individual payload chunks and EOF
//!   - [`PayloadSize`]: Tells how the request body is delimited
//!
//! - **Request Processing** ([`environ`]): The per-request mapping handed to handlers
//!   - [`RequestHead`]: What the header parser extracts from the wire
//!   - [`EnvironTemplate`]: Immutable per-connection defaults
//!   - [`Environ`]: Template, head and body handle layered together
//!
//! - **Response Processing** ([`response`]): Status line, ordered headers, body chunks
//!
//! - **Body Streaming** ([`body`]): The request body handle and its producer side
//!
//! - **Error Handling** ([`error`]): Error types of every phase

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod environ;
pub use environ::Environ;
pub use environ::EnvironTemplate;
pub use environ::RequestHead;
pub use environ::protocol_name;

mod response;
pub use response::Response;
pub use response::ResponseHead;

mod error;
pub use error::BodyError;
pub use error::HttpError;
pub use error::InvalidStatusLine;
pub use error::ParseError;
pub use error::SendError;

pub mod body;
