//! viewcache - per-cycle computation value cache
//!
//! A high-throughput store of intermediate and final results produced by a
//! dependency-graph evaluation engine, keyed by logical value descriptor.
//! Descriptors are compressed into compact identifiers shared process-wide;
//! the physical store is swappable between a pure in-memory map and an
//! embedded persistent environment that self-heals from stale locks.
//!
//! # Quick Start
//!
//! ```
//! use viewcache::{CacheScope, ComputationCacheSource, ComputedValue, ValueDescriptor};
//!
//! # fn main() -> viewcache::Result<()> {
//! let source = ComputationCacheSource::in_memory();
//!
//! let scope = CacheScope::new("Risk", "Default", chrono::Utc::now());
//! let cache = source.get_cache(&scope)?;
//!
//! let descriptor = ValueDescriptor::new("Trade/42", "PresentValue")
//!     .with_property("Currency", "USD");
//! cache.put_value(&descriptor, &ComputedValue::Float(1234.56))?;
//! assert_eq!(
//!     cache.get_value(&descriptor)?,
//!     Some(ComputedValue::Float(1234.56))
//! );
//!
//! source.release_cache(&scope)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The [`ComputationCacheSource`] is the entry point: it owns the
//! identifier map and the storage backend and hands out one
//! [`ViewComputationCache`] per [`CacheScope`]. Storage backends implement
//! the `BinaryDataStore` seam and are selected through [`CacheConfig`].

// Re-export the public API from viewcache-engine
pub use viewcache_engine::*;
