//! Decoder for bodies announced without a length.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{ParseError, PayloadItem};

/// Takes whatever was buffered behind the head as the whole body.
///
/// Without a `Content-Length` there is no way to tell where such a body ends, so it
/// completes with the first decode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemainingDecoder {
    taken: bool,
}

impl RemainingDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for RemainingDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.taken || src.is_empty() {
            self.taken = true;
            return Ok(Some(PayloadItem::Eof));
        }

        self.taken = true;
        Ok(Some(PayloadItem::Chunk(src.split().freeze())))
    }
}
