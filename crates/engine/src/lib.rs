//! Computation value cache engine
//!
//! Ties the cache core together:
//! - [`IdentifierMap`]: descriptor ↔ identifier compression, shared
//!   process-wide
//! - [`ViewComputationCache`]: get/put of computed values for one scope
//! - [`ComputationCacheSource`]: scope registry owning the identifier map
//!   and the storage backend
//! - [`BincodeValueSerializer`]: default serializer for deployments that
//!   do not bring their own

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod identifier_map;
pub mod serializer;
pub mod source;
pub mod view_cache;

pub use identifier_map::IdentifierMap;
pub use serializer::BincodeValueSerializer;
pub use source::ComputationCacheSource;
pub use view_cache::ViewComputationCache;

// Re-export the core vocabulary so callers need a single crate
pub use viewcache_core::{
    BinaryDataStore, BinaryDataStoreFactory, CacheBackend, CacheConfig, CacheError, CacheScope,
    ComputedValue, DurabilityMode, IdentifierStore, Result, TargetRef, ValueDescriptor,
    ValueIdentifier, ValueSerializer,
};
