//! Request line and header parsing.
//!
//! [`HeaderDecoder`] waits until the blank line ending the head is buffered, splits the
//! head off the buffer and hands it to [`parse_head`]. The head is turned into CGI style
//! fields right away:
//!
//! - the request target is split on the first `?` into `PATH_INFO` and `QUERY_STRING`
//! - `PATH_INFO` is percent-decoded, except that encoded slashes stay `%2F` so that they
//!   never become segment separators
//! - header names are upper-cased with `-` replaced by `_` and prefixed with `HTTP_`,
//!   except `CONTENT_TYPE` and `CONTENT_LENGTH`
//! - repeated headers are joined with `", "`, continuation lines (leading space or tab)
//!   are appended trimmed to the previous value
//!
//! # Limits
//!
//! - Maximum request line: 2 KiB, answered with 414
//! - Maximum head size: 64 KiB, answered with 414
//! - Only HTTP/1.0 and HTTP/1.1, anything else is answered with 505

use std::collections::HashMap;

use bytes::BytesMut;
use http::{Method, Version};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, PayloadSize, RequestHead};

/// Maximum length of the request line, without its CRLF
pub const MAX_REQUEST_LINE: usize = 2 * 1024;

/// Maximum number of bytes before the body, blank line included
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Decoder for request heads implementing the [`Decoder`] trait.
///
/// Yields the parsed [`RequestHead`] together with the [`PayloadSize`] announced by its
/// headers. Bytes behind the head are left in the buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (RequestHead, PayloadSize);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let window = &src[..src.len().min(MAX_HEAD_BYTES)];

        let Some(position) = find(window, HEAD_TERMINATOR) else {
            // the request line can be rejected long before the head is complete
            let line_window = &src[..src.len().min(MAX_REQUEST_LINE + 2)];
            ensure!(
                find(line_window, b"\r\n").is_some() || src.len() < MAX_REQUEST_LINE + 2,
                ParseError::request_line_too_long(src.len(), MAX_REQUEST_LINE)
            );
            ensure!(src.len() < MAX_HEAD_BYTES, ParseError::too_large_header(src.len(), MAX_HEAD_BYTES));
            return Ok(None);
        };

        let head_bytes = src.split_to(position + HEAD_TERMINATOR.len());
        trace!(head_size = head_bytes.len(), "request head received");

        let head = parse_head(&head_bytes)?;
        let payload_size = payload_size(&head)?;

        Ok(Some((head, payload_size)))
    }
}

/// Parses the bytes of a request head, from the request line up to the blank line.
///
/// Parsing stops at the first empty line; a head without one is parsed as far as it goes.
///
/// # Errors
///
/// - [`ParseError::RequestLineTooLong`] when the request line exceeds 2 KiB
/// - [`ParseError::UnsupportedVersion`] for anything but `HTTP/1.0` and `HTTP/1.1`
/// - [`ParseError::BadRequest`] for a malformed request line, header line or percent escape
pub fn parse_head(data: &[u8]) -> Result<RequestHead, ParseError> {
    let mut lines = Lines { rest: data };

    let request_line = lines.next().ok_or_else(|| ParseError::bad_request("empty request"))?;
    ensure!(
        request_line.len() <= MAX_REQUEST_LINE,
        ParseError::request_line_too_long(request_line.len(), MAX_REQUEST_LINE)
    );

    let tokens: Vec<&[u8]> = request_line.split(|b| *b == b' ').collect();
    let [method, target, version] = tokens.as_slice() else {
        return Err(ParseError::bad_request(format!("malformed request line: {:?}", latin1(request_line))));
    };

    let protocol = match *version {
        b"HTTP/1.0" => Version::HTTP_10,
        b"HTTP/1.1" => Version::HTTP_11,
        other => return Err(ParseError::unsupported_version(latin1(other))),
    };

    let method = Method::from_bytes(method).map_err(|_| ParseError::bad_request(format!("invalid method {:?}", latin1(method))))?;
    ensure!(!target.is_empty(), ParseError::bad_request("empty request target"));

    let (path, query) = match target.iter().position(|b| *b == b'?') {
        Some(index) => (&target[..index], &target[index + 1..]),
        None => (*target, &b""[..]),
    };

    let headers = parse_headers(lines)?;

    Ok(RequestHead {
        method,
        request_uri: latin1(target),
        protocol,
        path_info: decode_path(path)?,
        query_string: latin1(query),
        headers,
    })
}

fn parse_headers(lines: Lines<'_>) -> Result<HashMap<String, String>, ParseError> {
    let mut headers: HashMap<String, String> = HashMap::new();
    let mut last_key: Option<String> = None;

    for line in lines {
        if line.is_empty() {
            break;
        }

        if line[0] == b' ' || line[0] == b'\t' {
            let key = last_key.as_ref().ok_or_else(|| ParseError::bad_request("continuation line before any header"))?;
            if let Some(value) = headers.get_mut(key) {
                value.push_str(&latin1(line.trim_ascii()));
            }
            continue;
        }

        let colon = line
            .iter()
            .position(|b| *b == b':')
            .ok_or_else(|| ParseError::bad_request(format!("malformed header line: {:?}", latin1(line))))?;

        let name = line[..colon].trim_ascii();
        ensure!(!name.is_empty(), ParseError::bad_request("empty header name"));

        let key = environ_key(name);
        let value = latin1(line[colon + 1..].trim_ascii());

        headers
            .entry(key.clone())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
        last_key = Some(key);
    }

    Ok(headers)
}

/// Determines how the body of `head` is delimited.
///
/// A `Content-Length` header gives the exact size. A `Content-Type` without a length
/// announces a body made of whatever arrived together with the head.
///
/// # Errors
///
/// Returns [`ParseError::InvalidContentLength`] when `Content-Length` is not a number.
pub fn payload_size(head: &RequestHead) -> Result<PayloadSize, ParseError> {
    match (head.header("CONTENT_LENGTH"), head.header("CONTENT_TYPE")) {
        (Some(value), _) => {
            let length = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::invalid_content_length(format!("value {value} is not u64")))?;

            if length == 0 { Ok(PayloadSize::Empty) } else { Ok(PayloadSize::Length(length)) }
        }
        (None, Some(_)) => Ok(PayloadSize::Remaining),
        (None, None) => Ok(PayloadSize::Empty),
    }
}

fn environ_key(name: &[u8]) -> String {
    let name: String = name.iter().map(|b| if *b == b'-' { '_' } else { char::from(b.to_ascii_uppercase()) }).collect();

    if name == "CONTENT_TYPE" || name == "CONTENT_LENGTH" { name } else { format!("HTTP_{name}") }
}

/// Percent-decodes a path while keeping encoded slashes as `%2F`.
fn decode_path(path: &[u8]) -> Result<String, ParseError> {
    let mut decoded = Vec::with_capacity(path.len());

    for (index, part) in split_encoded_slash(path).into_iter().enumerate() {
        if index > 0 {
            decoded.extend_from_slice(b"%2F");
        }
        percent_decode(part, &mut decoded)?;
    }

    String::from_utf8(decoded).map_err(|_| ParseError::bad_request("path is not valid utf-8"))
}

fn split_encoded_slash(path: &[u8]) -> Vec<&[u8]> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while index + 3 <= path.len() {
        if path[index] == b'%' && path[index + 1] == b'2' && path[index + 2].eq_ignore_ascii_case(&b'f') {
            parts.push(&path[start..index]);
            index += 3;
            start = index;
        } else {
            index += 1;
        }
    }

    parts.push(&path[start..]);
    parts
}

fn percent_decode(src: &[u8], dst: &mut Vec<u8>) -> Result<(), ParseError> {
    let mut iter = src.iter();

    while let Some(&byte) = iter.next() {
        if byte != b'%' {
            dst.push(byte);
            continue;
        }

        let high = iter.next().and_then(|b| hex_value(*b));
        let low = iter.next().and_then(|b| hex_value(*b));
        match (high, low) {
            (Some(high), Some(low)) => dst.push((high << 4) | low),
            _ => return Err(ParseError::bad_request("malformed percent escape in path")),
        }
    }

    Ok(())
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Maps every byte to the char of the same code point.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Iterates CRLF terminated lines, the last line may lack its terminator.
struct Lines<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        match find(self.rest, b"\r\n") {
            Some(index) => {
                let line = &self.rest[..index];
                self.rest = &self.rest[index + 2..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = &[];
                Some(line)
            }
        }
    }
}
