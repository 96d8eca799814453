//! In-memory storage module
//!
//! Holds the key-value map behind a reader/writer lock.
//! This module knows nothing about the wire protocol or the gateway (loose coupling).

mod memory;

pub use memory::MemoryStore;
