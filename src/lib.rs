//! FerrumKV - A two-tier in-memory key-value store
//!
//! A JSON/HTTP gateway in front of a storage service reached over TCP:
//! - `store` holds the map behind a reader/writer lock
//! - `protocol`, `dispatch` and `server` expose it to gateways
//! - `client`, `gateway` and `web` translate the public API into storage calls

pub mod config;
pub mod protocol;
pub mod store;
pub mod dispatch;
pub mod server;
pub mod client;
pub mod gateway;
pub mod web;

/// Re-export commonly used types
pub use store::MemoryStore;
pub use protocol::{RespValue, RespError};
pub use client::{KvClient, RemoteClient, ClientError};
pub use gateway::{Gateway, Status};
pub use config::Config;
