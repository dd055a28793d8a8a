//! HTTP codec module for decoding requests and encoding responses
//!
//! This module provides the streaming message processing of the connection:
//!
//! - Request handling:
//!   - [`RequestDecoder`]: Decodes incoming requests, head first, then the payload
//!   - [`parse_head`]: Turns the bytes of a head into a [`RequestHead`](crate::protocol::RequestHead)
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: Writes the status line, headers and body chunks
//!
//! Both sides implement the `tokio_util::codec` traits so they can be driven over any
//! buffer, the connection feeds them from its own read and write buffers.

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use header::MAX_HEAD_BYTES;
pub use header::MAX_REQUEST_LINE;
pub use header::parse_head;
pub use header::payload_size;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
