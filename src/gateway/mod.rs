//! Gateway adapter
//!
//! Translates the public Store/Retrieve/Remove contract into storage client
//! calls and maps the replies back. Holds no state of its own.

mod types;

pub use types::{
    Status, StoreRequest, StatusResponse, RetrieveResponse, ErrorResponse, Reply, GatewayError,
};

use crate::client::KvClient;
use tracing::{debug, warn};

/// Gateway adapter over a storage client
pub struct Gateway<C> {
    client: C,
}

impl<C: KvClient> Gateway<C> {
    /// Create a gateway over `client`
    pub fn new(client: C) -> Self {
        Gateway { client }
    }

    /// Get reference to the storage client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Store a key/value pair; both fields must be present, empty strings are fine
    pub async fn store(&self, request: StoreRequest) -> Result<Reply<StatusResponse>, GatewayError> {
        let (key, value) = match (request.key, request.value) {
            (Some(key), Some(value)) => (key, value),
            (None, _) => return Err(GatewayError::InvalidRequest("field 'key' is required".into())),
            (_, None) => return Err(GatewayError::InvalidRequest("field 'value' is required".into())),
        };

        let reply = self.client.set(key, value).await.map_err(|source| {
            warn!("Set failed: {}", source);
            GatewayError::Backend { operation: "set", source }
        })?;

        Ok(Reply::success(StatusResponse {
            success: reply.success,
            message: reply.message,
        }))
    }

    /// Retrieve the value of `key`
    pub async fn retrieve(&self, key: Option<String>) -> Result<Reply<RetrieveResponse>, GatewayError> {
        let key = require_key(key)?;

        let reply = self.client.get(key.clone()).await.map_err(|source| {
            warn!("Get failed for key={}: {}", key, source);
            GatewayError::Backend { operation: "get", source }
        })?;
        debug!("Retrieve key={}, found={}", key, reply.found);

        if !reply.found {
            return Ok(Reply::not_found(RetrieveResponse {
                found: false,
                message: reply.message,
                key: None,
                value: None,
            }));
        }

        Ok(Reply::success(RetrieveResponse {
            found: true,
            message: reply.message,
            key: Some(key),
            value: Some(reply.value),
        }))
    }

    /// Remove `key`; an absent key is reported as not-found
    pub async fn remove(&self, key: Option<String>) -> Result<Reply<StatusResponse>, GatewayError> {
        let key = require_key(key)?;

        let reply = self.client.delete(key.clone()).await.map_err(|source| {
            warn!("Delete failed for key={}: {}", key, source);
            GatewayError::Backend { operation: "delete", source }
        })?;
        debug!("Remove key={}, success={}", key, reply.success);

        let body = StatusResponse {
            success: reply.success,
            message: reply.message,
        };
        Ok(if body.success { Reply::success(body) } else { Reply::not_found(body) })
    }
}

fn require_key(key: Option<String>) -> Result<String, GatewayError> {
    key.ok_or_else(|| GatewayError::InvalidRequest("Key parameter is required".into()))
}
