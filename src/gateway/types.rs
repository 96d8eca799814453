//! Public request/response shapes of the gateway

use crate::client::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome class of a gateway operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// Malformed or incomplete request; the storage tier was not called
    ClientError,
    /// The key has no entry
    NotFound,
    /// The storage tier could not be reached or failed
    ServerError,
}

/// Body of a Store request
///
/// Fields are optional so that a missing field can be told apart from an
/// explicitly empty string.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreRequest {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Store and Remove response
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

/// Retrieve response; `key` and `value` are only present when found
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetrieveResponse {
    pub found: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Error body for client and server errors
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A non-error reply: either success or not-found
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: Status,
    pub body: T,
}

impl<T> Reply<T> {
    pub fn success(body: T) -> Self {
        Reply { status: Status::Success, body }
    }

    pub fn not_found(body: T) -> Self {
        Reply { status: Status::NotFound, body }
    }
}

/// Gateway failures
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Rejected before reaching the storage tier
    InvalidRequest(String),

    /// The storage call failed; says nothing about key existence
    Backend { operation: &'static str, source: ClientError },
}

impl GatewayError {
    pub fn status(&self) -> Status {
        match self {
            GatewayError::InvalidRequest(_) => Status::ClientError,
            GatewayError::Backend { .. } => Status::ServerError,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse { error: self.to_string() }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            GatewayError::Backend { operation, source } => {
                write!(f, "Failed to {} key: {}", operation, source)
            }
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::InvalidRequest(_) => None,
            GatewayError::Backend { source, .. } => Some(source),
        }
    }
}
