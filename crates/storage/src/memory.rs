//! In-memory binary data store
//!
//! The in-memory backend is a map guarded by `parking_lot::RwLock`. No
//! persistence: all data is lost when the process exits, which is the
//! intended behavior when cross-process sharing of the cache is not needed.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use viewcache_core::{
    BinaryDataStore, BinaryDataStoreFactory, CacheScope, Result, ValueIdentifier,
};

/// Binary data store backed by an in-process hash map
///
/// Thread-safe through `parking_lot::RwLock`; concurrent `get`s take the
/// read lock, `put`/`remove_all` take the write lock, so a read strictly
/// after a completed write for the same identifier observes that write.
#[derive(Debug, Default)]
pub struct InMemoryBinaryStore {
    entries: RwLock<FxHashMap<u64, Vec<u8>>>,
}

impl InMemoryBinaryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl BinaryDataStore for InMemoryBinaryStore {
    fn get(&self, id: ValueIdentifier) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(&id.as_u64()).cloned())
    }

    fn put(&self, id: ValueIdentifier, bytes: &[u8]) -> Result<()> {
        self.entries.write().insert(id.as_u64(), bytes.to_vec());
        Ok(())
    }

    fn remove_all(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}

/// Factory handing out in-memory stores, one per scope
///
/// Stores are memoized per scope so `open_or_create` is deterministic:
/// the same scope always yields the same store until its data is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStoreFactory {
    stores: DashMap<CacheScope, Arc<InMemoryBinaryStore>>,
}

impl InMemoryStoreFactory {
    /// Create a factory with no open stores
    pub fn new() -> Self {
        Self::default()
    }
}

impl BinaryDataStoreFactory for InMemoryStoreFactory {
    fn open_or_create(&self, scope: &CacheScope) -> Result<Arc<dyn BinaryDataStore>> {
        let store = self
            .stores
            .entry(scope.clone())
            .or_insert_with(|| Arc::new(InMemoryBinaryStore::new()))
            .clone();
        Ok(store)
    }
}
