//! Storage client module
//!
//! The gateway only talks to the storage tier through [`KvClient`], so the
//! TCP client can be swapped for a test double without touching the adapter.

mod remote;

pub use remote::RemoteClient;

use crate::protocol::{RespError, SetReply, GetReply, DeleteReply};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Typed interface to the storage service
pub trait KvClient: Send + Sync + 'static {
    /// Store `value` under `key`
    fn set(&self, key: String, value: String)
        -> impl Future<Output = Result<SetReply, ClientError>> + Send;

    /// Look `key` up
    fn get(&self, key: String)
        -> impl Future<Output = Result<GetReply, ClientError>> + Send;

    /// Remove `key`
    fn delete(&self, key: String)
        -> impl Future<Output = Result<DeleteReply, ClientError>> + Send;

    /// Check that the storage service answers
    fn ping(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Failure to obtain an answer from the storage service
///
/// None of these says anything about whether a key exists.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Could not connect, or the connection failed mid-call
    Unavailable(String),

    /// No reply within the configured timeout
    Timeout(Duration),

    /// The reply could not be decoded
    Protocol(RespError),

    /// The service answered with an error frame
    Remote(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Unavailable(msg) => write!(f, "storage service unavailable: {}", msg),
            ClientError::Timeout(after) => write!(f, "storage service timed out after {:?}", after),
            ClientError::Protocol(e) => write!(f, "bad reply from storage service: {}", e),
            ClientError::Remote(msg) => write!(f, "storage service error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Unavailable(e.to_string())
    }
}

impl From<RespError> for ClientError {
    fn from(e: RespError) -> Self {
        ClientError::Protocol(e)
    }
}
