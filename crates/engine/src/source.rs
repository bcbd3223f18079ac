//! Computation cache source
//!
//! The registry that creates, looks up and releases view computation
//! caches per scope. Owns the identifier map and the store factory (and
//! through it the storage environment) for its process.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use viewcache_core::{
    BinaryDataStoreFactory, CacheConfig, CacheScope, Result, ValueSerializer,
};
use viewcache_storage::{open_factory, InMemoryStoreFactory};

use crate::identifier_map::IdentifierMap;
use crate::serializer::BincodeValueSerializer;
use crate::view_cache::ViewComputationCache;

/// Registry of view computation caches, keyed by scope
///
/// `get_cache` creates on first access; the concurrent-entry discipline
/// guarantees exactly one backing store per scope even when worker threads
/// race on first access. `release_cache` drops a scope's entries and
/// forgets the scope, and is idempotent.
pub struct ComputationCacheSource {
    identifiers: Arc<IdentifierMap>,
    factory: Arc<dyn BinaryDataStoreFactory>,
    serializer: Arc<dyn ValueSerializer>,
    caches: DashMap<CacheScope, Arc<ViewComputationCache>>,
}

impl ComputationCacheSource {
    /// Assemble a source over explicit collaborators
    ///
    /// The identifier map is passed in rather than created internally so a
    /// process can share one map across sources if it ever runs several.
    pub fn new(
        identifiers: Arc<IdentifierMap>,
        factory: Arc<dyn BinaryDataStoreFactory>,
        serializer: Arc<dyn ValueSerializer>,
    ) -> Self {
        Self {
            identifiers,
            factory,
            serializer,
            caches: DashMap::new(),
        }
    }

    /// Source over the in-memory backend with the default serializer
    pub fn in_memory() -> Self {
        Self::in_memory_with_serializer(Arc::new(BincodeValueSerializer::new()))
    }

    /// Source over the in-memory backend with a caller-supplied serializer
    pub fn in_memory_with_serializer(serializer: Arc<dyn ValueSerializer>) -> Self {
        Self::new(
            Arc::new(IdentifierMap::new()),
            Arc::new(InMemoryStoreFactory::new()),
            serializer,
        )
    }

    /// Source over the backend selected by `config`
    ///
    /// # Errors
    ///
    /// A persistent environment that cannot be opened, even after the one
    /// automatic destroy-and-retry recovery, aborts construction with
    /// `EnvironmentUnavailable`.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::from_config_with_serializer(config, Arc::new(BincodeValueSerializer::new()))
    }

    /// Source over the backend selected by `config`, with a caller-supplied
    /// serializer
    ///
    /// When the backend keeps data across processes, identifier
    /// assignments recorded by prior processes over the same environment
    /// are loaded here, so descriptors resolve to the identifiers their
    /// on-disk entries are keyed by.
    ///
    /// # Errors
    ///
    /// Propagates environment-open failures and assignment-load failures.
    pub fn from_config_with_serializer(
        config: &CacheConfig,
        serializer: Arc<dyn ValueSerializer>,
    ) -> Result<Self> {
        let factory = open_factory(config)?;
        let identifiers = match factory.identifier_store() {
            Some(store) => IdentifierMap::with_durable_store(store)?,
            None => IdentifierMap::new(),
        };
        Ok(Self::new(Arc::new(identifiers), factory, serializer))
    }

    /// Get the cache for a scope, creating it on first access
    ///
    /// # Errors
    ///
    /// Propagates store-creation failures from the factory; no registry
    /// entry is left behind when creation fails.
    pub fn get_cache(&self, scope: &CacheScope) -> Result<Arc<ViewComputationCache>> {
        // Fast path: scope already registered
        if let Some(cache) = self.caches.get(scope) {
            return Ok(Arc::clone(&cache));
        }

        match self.caches.entry(scope.clone()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                // Single winner: the entry lock holds racing callers until
                // the store exists, so only one store is ever created
                let store = self.factory.open_or_create(scope)?;
                let cache = Arc::new(ViewComputationCache::new(
                    Arc::clone(&self.identifiers),
                    store,
                    Arc::clone(&self.serializer),
                ));
                entry.insert(Arc::clone(&cache));
                debug!(scope = %scope, "created computation cache");
                Ok(cache)
            }
        }
    }

    /// Release a scope: drop its entries and forget its cache
    ///
    /// Idempotent; releasing a scope that was never created (or already
    /// released) is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates storage failures from dropping the scope's entries.
    pub fn release_cache(&self, scope: &CacheScope) -> Result<()> {
        if let Some((_, cache)) = self.caches.remove(scope) {
            cache.clear()?;
            debug!(scope = %scope, "released computation cache");
        }
        Ok(())
    }

    /// The identifier map shared by every cache of this source
    pub fn identifier_map(&self) -> &Arc<IdentifierMap> {
        &self.identifiers
    }

    /// Number of currently registered scopes
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// Whether no scope is currently registered
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}
