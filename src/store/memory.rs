//! In-memory storage implementation

use parking_lot::RwLock;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

/// Type alias for our hash map with SipHasher
type StoreMap = HashMap<String, String, BuildHasherDefault<SipHasher13>>;

/// In-memory key-value store
///
/// Any number of readers may hold the lock at once; `put` and `delete`
/// take it exclusively. The critical sections only touch the map, so no
/// caller ever waits on I/O while the lock is held.
pub struct MemoryStore {
    map: RwLock<StoreMap>,
}

impl MemoryStore {
    /// Create a new memory store with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new memory store with specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            map: RwLock::new(HashMap::with_capacity_and_hasher(
                capacity,
                BuildHasherDefault::<SipHasher13>::default(),
            )),
        }
    }

    /// Insert or overwrite a key. Returns true if the key was new.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let (key, value) = (key.into(), value.into());
        self.map.write().insert(key, value).is_none()
    }

    /// Get a copy of the value stored under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    /// Delete a key, returns true if the key existed
    pub fn delete(&self, key: &str) -> bool {
        self.map.write().remove(key).is_some()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
