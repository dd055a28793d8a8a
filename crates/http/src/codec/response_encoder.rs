//! Response serialization.
//!
//! The status line uses the protocol of the request being answered, headers are written
//! verbatim and in order, body chunks follow the blank line untouched. No header is added
//! or rewritten here.

use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::Version;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{Message, PayloadItem, ResponseHead, SendError, protocol_name};

/// Initial buffer size reserved for a response head
const INIT_HEADER_SIZE: usize = 1024;

#[derive(Debug, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Message<ResponseHead>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<ResponseHead>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header(head) => encode_head(&head, dst),
            Message::Payload(PayloadItem::Chunk(bytes)) => {
                dst.extend_from_slice(&bytes);
                Ok(())
            }
            Message::Payload(PayloadItem::Eof) => Ok(()),
        }
    }
}

fn encode_head(head: &ResponseHead, dst: &mut BytesMut) -> Result<(), SendError> {
    let version = head.version();
    if version != Version::HTTP_10 && version != Version::HTTP_11 {
        error!(?version, "response version not supported");
        return Err(SendError::invalid_head(format!("unsupported version {version:?}")));
    }

    dst.reserve(INIT_HEADER_SIZE);
    let mut writer = dst.writer();
    write!(writer, "{} {} {}\r\n", protocol_name(version), head.status().as_str(), head.reason())?;
    for (name, value) in head.headers() {
        write!(writer, "{name}: {value}\r\n")?;
    }
    writer.write_all(b"\r\n")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Response;
    use bytes::Bytes;
    use http::StatusCode;

    fn encode(response: Response, version: Version) -> Result<BytesMut, SendError> {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        let (head, body) = response.into_parts(version);

        encoder.encode(Message::Header(head), &mut dst)?;
        for chunk in body {
            encoder.encode(Message::Payload(PayloadItem::Chunk(chunk)), &mut dst)?;
        }
        encoder.encode(Message::Payload(PayloadItem::Eof), &mut dst)?;
        Ok(dst)
    }

    #[test]
    fn headers_in_order_then_chunks() {
        let response = Response::new(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .header("X-B", "2")
            .header("X-A", "1")
            .body(Bytes::from_static(b"Hello, "))
            .body(Bytes::from_static(b"World!"));

        let dst = encode(response, Version::HTTP_11).unwrap();
        assert_eq!(&dst[..], &b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nX-B: 2\r\nX-A: 1\r\n\r\nHello, World!"[..]);
    }

    #[test]
    fn status_line_follows_the_request_protocol() {
        let response = Response::from_status_line("404 Nope").unwrap();
        let dst = encode(response, Version::HTTP_10).unwrap();
        assert_eq!(&dst[..], &b"HTTP/1.0 404 Nope\r\n\r\n"[..]);
    }

    #[test]
    fn unsupported_version() {
        let error = encode(Response::new(StatusCode::OK), Version::HTTP_2).unwrap_err();
        assert!(matches!(error, SendError::InvalidHead { .. }));
    }
}
