//! RESP2 parser and encoder
//!
//! The parser works on a borrowed view of the read buffer and only advances
//! the buffer once a whole frame is available, so a frame split across TCP
//! reads is never consumed partially.

use super::types::{RespValue, RespError};
use bytes::{Buf, BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

/// Largest bulk string accepted from a peer
const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Largest array accepted from a peer
const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Longest header line (type prefix up to CRLF) accepted from a peer
const MAX_LINE_LEN: usize = 64 * 1024;

/// Deepest array nesting accepted; requests and replies are one level deep
const MAX_DEPTH: usize = 4;

/// RESP2 Parser
pub struct RespParser;

impl RespParser {
    /// Parse a RESP value from a buffer
    ///
    /// Returns Ok(Some(value)) and advances the buffer if a complete value was parsed,
    /// Ok(None) if more data is needed (buffer untouched),
    /// Err(e) if parsing failed
    pub fn parse(buf: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
        match Self::parse_at(&buf[..], 0, 0)? {
            Some((value, consumed)) => {
                buf.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Parse the frame starting at `pos`, returning it with the position past its end
    fn parse_at(
        buf: &[u8],
        pos: usize,
        depth: usize,
    ) -> Result<Option<(RespValue, usize)>, RespError> {
        let Some(&prefix) = buf.get(pos) else {
            return Ok(None);
        };

        let (line, next) = match prefix {
            b'+' | b'-' | b':' | b'$' | b'*' => match Self::line_at(buf, pos + 1)? {
                Some(found) => found,
                None => return Ok(None),
            },
            other => {
                return Err(RespError::InvalidProtocol(
                    format!("Unknown type prefix: {}", other as char)
                ));
            }
        };

        match prefix {
            b'+' => Ok(Some((RespValue::SimpleString(Self::text(line)?), next))),
            b'-' => Ok(Some((RespValue::Error(Self::text(line)?), next))),
            b'$' => {
                let len = Self::length(line, MAX_BULK_LEN)?;
                let end = next + len;
                if buf.len() < end + CRLF.len() {
                    return Ok(None);
                }
                if &buf[end..end + CRLF.len()] != CRLF {
                    return Err(RespError::InvalidProtocol(
                        "Missing CRLF after bulk string data".to_string()
                    ));
                }
                let data = Bytes::copy_from_slice(&buf[next..end]);
                Ok(Some((RespValue::BulkString(data), end + CRLF.len())))
            }
            b'*' => {
                if depth >= MAX_DEPTH {
                    return Err(RespError::InvalidProtocol("nesting too deep".to_string()));
                }
                let count = Self::length(line, MAX_ARRAY_LEN)?;
                let mut elements = Vec::with_capacity(count.min(16));
                let mut cursor = next;
                for _ in 0..count {
                    match Self::parse_at(buf, cursor, depth + 1)? {
                        Some((value, after)) => {
                            elements.push(value);
                            cursor = after;
                        }
                        None => return Ok(None),
                    }
                }
                Ok(Some((RespValue::Array(elements), cursor)))
            }
            _ => Ok(Some((RespValue::Integer(Self::integer(line)?), next))),
        }
    }

    /// Find the line starting at `start`; returns it without CRLF and the offset after CRLF
    ///
    /// Only the first `MAX_LINE_LEN` bytes are searched, so a peer that never
    /// sends CRLF is rejected instead of growing the buffer forever.
    fn line_at(buf: &[u8], start: usize) -> Result<Option<(&[u8], usize)>, RespError> {
        let rest = buf.get(start..).unwrap_or_default();
        let window = &rest[..rest.len().min(MAX_LINE_LEN + CRLF.len())];
        match window.windows(2).position(|w| w == CRLF) {
            Some(end) => Ok(Some((&rest[..end], start + end + CRLF.len()))),
            None if rest.len() > MAX_LINE_LEN => Err(RespError::InvalidProtocol(
                format!("Header line longer than {} bytes", MAX_LINE_LEN)
            )),
            None => Ok(None),
        }
    }

    fn text(line: &[u8]) -> Result<String, RespError> {
        String::from_utf8(line.to_vec()).map_err(|_| RespError::InvalidUtf8)
    }

    fn integer(line: &[u8]) -> Result<i64, RespError> {
        std::str::from_utf8(line)
            .map_err(|_| RespError::InvalidUtf8)?
            .parse::<i64>()
            .map_err(|_| RespError::InvalidInteger)
    }

    fn length(line: &[u8], max: usize) -> Result<usize, RespError> {
        let len = Self::integer(line)?;
        if len < 0 || len as u64 > max as u64 {
            return Err(RespError::InvalidProtocol(format!("Invalid length: {}", len)));
        }
        Ok(len as usize)
    }
}

/// RESP2 Encoder
pub struct RespEncoder;

impl RespEncoder {
    /// Encode a RESP value to bytes
    pub fn encode(value: &RespValue) -> Bytes {
        let mut buf = BytesMut::new();
        Self::encode_to(&mut buf, value);
        buf.freeze()
    }

    /// Encode a RESP value into an existing buffer
    pub fn encode_to(buf: &mut BytesMut, value: &RespValue) {
        match value {
            RespValue::SimpleString(s) => Self::put_line(buf, b'+', s.as_bytes()),
            RespValue::Error(e) => Self::put_line(buf, b'-', e.as_bytes()),
            RespValue::Integer(i) => Self::put_line(buf, b':', i.to_string().as_bytes()),
            RespValue::BulkString(bytes) => {
                Self::put_line(buf, b'$', bytes.len().to_string().as_bytes());
                buf.put_slice(bytes);
                buf.put_slice(CRLF);
            }
            RespValue::Array(arr) => {
                Self::put_line(buf, b'*', arr.len().to_string().as_bytes());
                for elem in arr {
                    Self::encode_to(buf, elem);
                }
            }
        }
    }

    fn put_line(buf: &mut BytesMut, prefix: u8, body: &[u8]) {
        buf.put_u8(prefix);
        buf.put_slice(body);
        buf.put_slice(CRLF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_string() {
        let mut buf = BytesMut::from("+PONG\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::SimpleString("PONG".to_string())));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let mut buf = BytesMut::from("-ERR bad request\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::Error("ERR bad request".to_string())));
    }

    #[test]
    fn test_parse_integer() {
        let mut buf = BytesMut::from(":-42\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::Integer(-42)));
    }

    #[test]
    fn test_parse_empty_bulk_string() {
        let mut buf = BytesMut::from("$0\r\n\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::BulkString(Bytes::new())));
    }

    #[test]
    fn test_parse_bulk_string_with_crlf_inside() {
        let mut buf = BytesMut::from("$4\r\na\r\nb\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::BulkString(Bytes::from("a\r\nb"))));
    }

    #[test]
    fn test_parse_array() {
        let mut buf = BytesMut::from("*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::Array(vec![
            RespValue::BulkString(Bytes::from("foo")),
            RespValue::BulkString(Bytes::from("bar")),
        ])));
    }

    #[test]
    fn test_incomplete_array_is_not_consumed() {
        let mut buf = BytesMut::from("*2\r\n$3\r\nfoo\r\n$3\r\nba");
        assert_eq!(RespParser::parse(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 19);

        buf.extend_from_slice(b"r\r\n");
        assert!(RespParser::parse(&mut buf).unwrap().is_some());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_pipelined_frames() {
        let mut buf = BytesMut::from(":1\r\n:2\r\n");
        assert_eq!(RespParser::parse(&mut buf).unwrap(), Some(RespValue::Integer(1)));
        assert_eq!(RespParser::parse(&mut buf).unwrap(), Some(RespValue::Integer(2)));
        assert_eq!(RespParser::parse(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_unknown_prefix() {
        let mut buf = BytesMut::from("hello");
        assert!(matches!(
            RespParser::parse(&mut buf),
            Err(RespError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn test_nesting_too_deep() {
        let mut buf = BytesMut::new();
        for _ in 0..200_000 {
            buf.extend_from_slice(b"*1\r\n");
        }
        buf.extend_from_slice(b":1\r\n");
        assert_eq!(
            RespParser::parse(&mut buf),
            Err(RespError::InvalidProtocol("nesting too deep".to_string()))
        );
    }

    #[test]
    fn test_nested_array_within_limit() {
        let mut buf = BytesMut::from("*1\r\n*1\r\n:7\r\n");
        assert_eq!(
            RespParser::parse(&mut buf).unwrap(),
            Some(RespValue::array(vec![RespValue::array(vec![RespValue::integer(7)])]))
        );
    }

    #[test]
    fn test_unterminated_line_rejected() {
        let mut buf = BytesMut::from("+");
        buf.extend_from_slice(&vec![b'a'; MAX_LINE_LEN]);
        assert_eq!(RespParser::parse(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"aa");
        assert!(matches!(
            RespParser::parse(&mut buf),
            Err(RespError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn test_negative_bulk_length_rejected() {
        let mut buf = BytesMut::from("$-1\r\n");
        assert!(RespParser::parse(&mut buf).is_err());
    }

    #[test]
    fn test_bulk_string_missing_crlf() {
        let mut buf = BytesMut::from("$3\r\nfooXX");
        assert!(RespParser::parse(&mut buf).is_err());
    }

    #[test]
    fn test_encode_array() {
        let value = RespValue::array(vec![
            RespValue::integer(1),
            RespValue::bulk_string("ok"),
        ]);
        let encoded = RespEncoder::encode(&value);
        assert_eq!(encoded, Bytes::from("*2\r\n:1\r\n$2\r\nok\r\n"));
    }
}
