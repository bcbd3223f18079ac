//! Binary data store backends for the computation value cache
//!
//! Two implementations of the `BinaryDataStore` seam:
//! - `InMemoryBinaryStore`: a lock-guarded in-process map, no persistence
//! - `PersistentBinaryStore`: one table per scope inside an embedded
//!   key-value environment on local disk
//!
//! plus the factories handing them out per scope, the storage-environment
//! lifecycle (including destroy-and-retry-once recovery from stale locks),
//! and [`open_factory`], the strategy selector that turns a `CacheConfig`
//! into the matching factory.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod environment;
pub mod memory;
pub mod persistent;

pub use environment::StorageEnvironment;
pub use memory::{InMemoryBinaryStore, InMemoryStoreFactory};
pub use persistent::{PersistentBinaryStore, PersistentIdentifierStore, PersistentStoreFactory};

use std::sync::Arc;

use viewcache_core::{BinaryDataStoreFactory, CacheBackend, CacheConfig, Result};

/// Build the store factory selected by a cache configuration
///
/// A strategy selector, not a hierarchy: in-memory configs get an
/// [`InMemoryStoreFactory`]; persistent configs open (or recover) the
/// storage environment and wrap it in a [`PersistentStoreFactory`].
///
/// # Errors
///
/// Propagates environment-open failures for the persistent backend,
/// including the fatal `EnvironmentUnavailable` after a failed recovery.
pub fn open_factory(config: &CacheConfig) -> Result<Arc<dyn BinaryDataStoreFactory>> {
    match &config.backend {
        CacheBackend::InMemory => Ok(Arc::new(InMemoryStoreFactory::new())),
        CacheBackend::Persistent { root, durability } => Ok(Arc::new(
            PersistentStoreFactory::open(root, *durability)?,
        )),
    }
}
