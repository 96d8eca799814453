//! Internal storage protocol
//!
//! RESP2-style framing plus the typed request/reply messages exchanged
//! between the gateway and the storage service. Independent from the store
//! and from HTTP (loose coupling).

mod types;
mod resp;
mod message;

pub use types::{RespValue, RespError};
pub use resp::{RespParser, RespEncoder};
pub use message::{Request, SetReply, GetReply, DeleteReply};
