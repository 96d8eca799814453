//! Typed storage requests and replies
//!
//! Requests travel as arrays of bulk strings (`SET key value`, `GET key`,
//! `DEL key`, `PING`). Replies carry an explicit integer flag followed by
//! bulk strings, so `found`/`success` never has to be inferred from a nil.

use super::types::{RespValue, RespError};
use bytes::Bytes;

/// A request sent from the gateway to the storage service
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    Ping,
}

impl Request {
    /// Command name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Request::Set { .. } => "SET",
            Request::Get { .. } => "GET",
            Request::Delete { .. } => "DEL",
            Request::Ping => "PING",
        }
    }

    /// Encode the request as a frame
    pub fn to_frame(&self) -> RespValue {
        let mut parts = vec![RespValue::bulk_string(self.name())];
        match self {
            Request::Set { key, value } => {
                parts.push(text_frame(key));
                parts.push(text_frame(value));
            }
            Request::Get { key } | Request::Delete { key } => parts.push(text_frame(key)),
            Request::Ping => {}
        }
        RespValue::array(parts)
    }

    /// Decode a request frame received by the storage service
    pub fn from_frame(frame: &RespValue) -> Result<Self, RespError> {
        let parts = match frame.as_array() {
            Some(parts) if !parts.is_empty() => parts,
            Some(_) => return Err(RespError::UnexpectedFrame("empty command array".into())),
            None => return Err(RespError::UnexpectedFrame("expected array".into())),
        };

        let name = text_at(parts, 0)?.to_uppercase();
        let args = &parts[1..];
        let expected = match name.as_str() {
            "SET" => 2,
            "GET" | "DEL" => 1,
            "PING" => 0,
            _ => return Err(RespError::UnexpectedFrame(format!("unknown command '{}'", name))),
        };
        if args.len() != expected {
            return Err(RespError::UnexpectedFrame(format!(
                "wrong number of arguments for '{}' command",
                name
            )));
        }

        Ok(match name.as_str() {
            "SET" => Request::Set { key: text_at(args, 0)?, value: text_at(args, 1)? },
            "GET" => Request::Get { key: text_at(args, 0)? },
            "DEL" => Request::Delete { key: text_at(args, 0)? },
            _ => Request::Ping,
        })
    }
}

/// Reply to `SET`
#[derive(Debug, Clone, PartialEq)]
pub struct SetReply {
    pub success: bool,
    pub message: String,
}

/// Reply to `GET`; `value` is empty when `found` is false
#[derive(Debug, Clone, PartialEq)]
pub struct GetReply {
    pub found: bool,
    pub value: String,
    pub message: String,
}

/// Reply to `DEL`
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteReply {
    pub success: bool,
    pub message: String,
}

impl SetReply {
    pub fn to_frame(&self) -> RespValue {
        RespValue::array(vec![flag_frame(self.success), text_frame(&self.message)])
    }

    pub fn from_frame(frame: &RespValue) -> Result<Self, RespError> {
        let parts = reply_parts(frame, 2)?;
        Ok(SetReply {
            success: flag_at(parts, 0)?,
            message: text_at(parts, 1)?,
        })
    }
}

impl GetReply {
    pub fn to_frame(&self) -> RespValue {
        RespValue::array(vec![
            flag_frame(self.found),
            text_frame(&self.value),
            text_frame(&self.message),
        ])
    }

    pub fn from_frame(frame: &RespValue) -> Result<Self, RespError> {
        let parts = reply_parts(frame, 3)?;
        Ok(GetReply {
            found: flag_at(parts, 0)?,
            value: text_at(parts, 1)?,
            message: text_at(parts, 2)?,
        })
    }
}

impl DeleteReply {
    pub fn to_frame(&self) -> RespValue {
        RespValue::array(vec![flag_frame(self.success), text_frame(&self.message)])
    }

    pub fn from_frame(frame: &RespValue) -> Result<Self, RespError> {
        let parts = reply_parts(frame, 2)?;
        Ok(DeleteReply {
            success: flag_at(parts, 0)?,
            message: text_at(parts, 1)?,
        })
    }
}

fn text_frame(s: &str) -> RespValue {
    RespValue::bulk_string(Bytes::copy_from_slice(s.as_bytes()))
}

fn flag_frame(flag: bool) -> RespValue {
    RespValue::integer(flag as i64)
}

fn reply_parts(frame: &RespValue, len: usize) -> Result<&[RespValue], RespError> {
    match frame.as_array() {
        Some(parts) if parts.len() == len => Ok(parts),
        _ => Err(RespError::UnexpectedFrame(format!("expected {}-element reply, got {}", len, frame))),
    }
}

fn text_at(parts: &[RespValue], index: usize) -> Result<String, RespError> {
    let bytes = parts[index]
        .as_bulk_string()
        .ok_or_else(|| RespError::UnexpectedFrame(format!("expected bulk string, got {}", parts[index])))?;
    String::from_utf8(bytes.to_vec()).map_err(|_| RespError::InvalidUtf8)
}

fn flag_at(parts: &[RespValue], index: usize) -> Result<bool, RespError> {
    match parts[index].as_integer() {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(RespError::UnexpectedFrame(format!("expected 0 or 1, got {}", parts[index]))),
    }
}
