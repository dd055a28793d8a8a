//! Decoder implementation for request payloads.
//!
//! This module provides a unified decoder for the ways a request body can be delimited:
//! - Content-Length based payloads
//! - Payloads announced without a length, see [`RemainingDecoder`]
//! - Requests with no body

use crate::codec::body::length_decoder::LengthDecoder;
use crate::codec::body::remaining_decoder::RemainingDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A unified decoder for request payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Take what is buffered behind the head
    Remaining(RemainingDecoder),

    /// Handle requests with no body
    NoBody,
}

impl PayloadDecoder {
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    pub fn remaining() -> Self {
        Self { kind: Kind::Remaining(RemainingDecoder::new()) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Returns whether this decoder handles requests with no body.
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::NoBody)
    }
}

impl From<PayloadSize> for PayloadDecoder {
    fn from(payload_size: PayloadSize) -> Self {
        match payload_size {
            PayloadSize::Length(length) => PayloadDecoder::fix_length(length),
            PayloadSize::Remaining => PayloadDecoder::remaining(),
            PayloadSize::Empty => PayloadDecoder::empty(),
        }
    }
}

/// Delegates to the decoder of the payload kind, no-body payloads end right away.
impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Remaining(remaining_decoder) => remaining_decoder.decode(src),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }
}
