//! RESP2 value types

use bytes::Bytes;
use std::fmt;

/// A single frame on a storage connection
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple strings: +PONG\r\n
    SimpleString(String),

    /// Errors: -ERR message\r\n
    Error(String),

    /// Integers: :1\r\n
    Integer(i64),

    /// Bulk strings: $6\r\nfoobar\r\n
    BulkString(Bytes),

    /// Arrays: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Create a simple string
    pub fn simple_string(s: impl Into<String>) -> Self {
        RespValue::SimpleString(s.into())
    }

    /// Create an error
    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    /// Create an integer
    pub fn integer(i: i64) -> Self {
        RespValue::Integer(i)
    }

    /// Create a bulk string from bytes
    pub fn bulk_string(b: impl Into<Bytes>) -> Self {
        RespValue::BulkString(b.into())
    }

    /// Create an array
    pub fn array(v: Vec<RespValue>) -> Self {
        RespValue::Array(v)
    }

    /// Try to extract array elements
    pub fn as_array(&self) -> Option<&[RespValue]> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to extract bulk string bytes
    pub fn as_bulk_string(&self) -> Option<&Bytes> {
        match self {
            RespValue::BulkString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Try to extract integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(s) => write!(f, "SimpleString({})", s),
            RespValue::Error(e) => write!(f, "Error({})", e),
            RespValue::Integer(i) => write!(f, "Integer({})", i),
            RespValue::BulkString(b) => write!(f, "BulkString({} bytes)", b.len()),
            RespValue::Array(arr) => write!(f, "Array({} elements)", arr.len()),
        }
    }
}

/// Framing and message errors
#[derive(Debug, Clone, PartialEq)]
pub enum RespError {
    /// Invalid protocol format
    InvalidProtocol(String),

    /// Invalid UTF-8 where text was expected
    InvalidUtf8,

    /// Length or integer field could not be parsed
    InvalidInteger,

    /// A well-formed frame that is not a known request or reply
    UnexpectedFrame(String),
}

impl fmt::Display for RespError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespError::InvalidProtocol(msg) => write!(f, "Invalid protocol: {}", msg),
            RespError::InvalidUtf8 => write!(f, "Invalid UTF-8"),
            RespError::InvalidInteger => write!(f, "Invalid integer"),
            RespError::UnexpectedFrame(msg) => write!(f, "Unexpected frame: {}", msg),
        }
    }
}

impl std::error::Error for RespError {}
