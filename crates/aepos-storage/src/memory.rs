//! In-memory database implementation.

use crate::{Database, StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Thread-safe in-memory key-value store.
///
/// Clones share the same underlying map, mirroring how handles to a real
/// database share one connection.
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    entries: Arc<RwLock<HashMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryDb {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Database for MemoryDb {
    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> StorageResult<()> {
        self.entries.write().insert(key.to_vec(), value);
        Ok(())
    }
}
