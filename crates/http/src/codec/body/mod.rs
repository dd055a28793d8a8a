//! Request body decoding.
//!
//! ## Decoders
//! - [`LengthDecoder`](length_decoder::LengthDecoder): bodies with a `Content-Length`
//! - [`RemainingDecoder`](remaining_decoder::RemainingDecoder): bodies announced by a
//!   `Content-Type` alone
//! - [`PayloadDecoder`]: picks one of the above from a [`PayloadSize`](crate::protocol::PayloadSize)
//!
//! Chunked transfer encoding is not decoded.

mod length_decoder;
mod payload_decoder;
mod remaining_decoder;

pub use payload_decoder::PayloadDecoder;
