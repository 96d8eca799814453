//! Request dispatcher
//!
//! Decodes request frames, applies them to the store and builds the reply
//! frames. Shared by every connection; the store does its own locking.

use crate::protocol::{Request, RespEncoder, RespValue, SetReply, GetReply, DeleteReply};
use crate::store::MemoryStore;
use base64::{Engine as _, engine::general_purpose};
use std::sync::Arc;
use tracing::{debug, warn};

/// Request dispatcher
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<MemoryStore>,
}

impl Dispatcher {
    /// Create a dispatcher over the given store
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Dispatcher { store }
    }

    /// Dispatch a single request frame and return the reply frame
    pub fn dispatch(&self, frame: RespValue) -> RespValue {
        let request = match Request::from_frame(&frame) {
            Ok(request) => request,
            Err(e) => {
                // Raw frame in Base64 so binary garbage stays readable in logs
                let b64 = general_purpose::STANDARD.encode(RespEncoder::encode(&frame));
                warn!("Rejected request ({}). Frame (B64): {}", e, b64);
                return RespValue::error(format!("ERR {}", e));
            }
        };

        match request {
            Request::Set { key, value } => self.set(key, value).to_frame(),
            Request::Get { key } => self.get(&key).to_frame(),
            Request::Delete { key } => self.delete(&key).to_frame(),
            Request::Ping => RespValue::simple_string("PONG"),
        }
    }

    /// Store a key, overwriting any previous value
    pub fn set(&self, key: String, value: String) -> SetReply {
        let message = format!("Key '{}' set successfully", key);
        let created = self.store.put(key.clone(), value);
        debug!("Set key={}, created={}", key, created);

        SetReply { success: true, message }
    }

    /// Look a key up
    pub fn get(&self, key: &str) -> GetReply {
        let value = self.store.get(key);
        debug!("Get key={}, found={}", key, value.is_some());

        match value {
            Some(value) => GetReply {
                found: true,
                value,
                message: "Key retrieved successfully".to_string(),
            },
            None => GetReply {
                found: false,
                value: String::new(),
                message: format!("Key '{}' not found", key),
            },
        }
    }

    /// Remove a key; reports `success=false` when it was absent
    pub fn delete(&self, key: &str) -> DeleteReply {
        let removed = self.store.delete(key);
        debug!("Delete key={}, success={}", key, removed);

        if removed {
            DeleteReply { success: true, message: format!("Key '{}' deleted successfully", key) }
        } else {
            DeleteReply { success: false, message: format!("Key '{}' not found", key) }
        }
    }

    /// Get reference to the store (for testing/inspection)
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}
