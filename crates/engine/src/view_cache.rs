//! View computation cache
//!
//! One cache per scope: combines the shared identifier map, the scope's
//! binary data store and the value serializer into get/put of computed
//! values by logical descriptor.

use std::sync::Arc;

use viewcache_core::{
    BinaryDataStore, ComputedValue, Result, ValueDescriptor, ValueSerializer,
};

use crate::identifier_map::IdentifierMap;

/// Cache of computed values for one evaluation cycle
///
/// Shared (read/write) by all worker threads of its cycle; every operation
/// is synchronous and internally thread-safe. The backing store is owned
/// exclusively by this cache, while the identifier map is shared across
/// every cache of the process.
pub struct ViewComputationCache {
    identifiers: Arc<IdentifierMap>,
    store: Arc<dyn BinaryDataStore>,
    serializer: Arc<dyn ValueSerializer>,
}

impl ViewComputationCache {
    /// Assemble a cache over its three collaborators
    pub fn new(
        identifiers: Arc<IdentifierMap>,
        store: Arc<dyn BinaryDataStore>,
        serializer: Arc<dyn ValueSerializer>,
    ) -> Self {
        Self {
            identifiers,
            store,
            serializer,
        }
    }

    /// Get the cached value for a descriptor
    ///
    /// Returns `Ok(None)` on a miss. Both "descriptor never seen" and
    /// "descriptor assigned but no bytes stored" are a uniform miss; a get
    /// never assigns an identifier.
    ///
    /// # Errors
    ///
    /// Propagates storage read failures and deserialization failures.
    pub fn get_value(&self, descriptor: &ValueDescriptor) -> Result<Option<ComputedValue>> {
        let Some(id) = self.identifiers.get(descriptor) else {
            return Ok(None);
        };
        let Some(bytes) = self.store.get(id)? else {
            return Ok(None);
        };
        Ok(Some(self.serializer.deserialize(&bytes)?))
    }

    /// Store the computed value for a descriptor
    ///
    /// Assigns an identifier if the descriptor has none yet, then fully
    /// replaces any prior entry for it in this scope's store.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures, storage write failures and
    /// identifier-space exhaustion.
    pub fn put_value(&self, descriptor: &ValueDescriptor, value: &ComputedValue) -> Result<()> {
        let id = self.identifiers.get_or_assign(descriptor)?;
        let bytes = self.serializer.serialize(value)?;
        self.store.put(id, &bytes)
    }

    /// Drop every entry in this cache's backing store
    ///
    /// Identifier assignments are untouched: they belong to the process,
    /// not the scope.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn clear(&self) -> Result<()> {
        self.store.remove_all()
    }
}
