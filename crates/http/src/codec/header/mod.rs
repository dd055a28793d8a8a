//! Request head decoding.
//!
//! - [`HeaderDecoder`]: splits the head off the read buffer once its blank line arrived
//! - [`parse_head`]: turns the head bytes into a [`RequestHead`](crate::protocol::RequestHead)
//! - [`payload_size`]: tells how the body behind a head is delimited

mod header_decoder;

pub use header_decoder::HeaderDecoder;
pub use header_decoder::MAX_HEAD_BYTES;
pub use header_decoder::MAX_REQUEST_LINE;
pub use header_decoder::parse_head;
pub use header_decoder::payload_size;
