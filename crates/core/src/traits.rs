//! Core traits for the cache's swappable seams
//!
//! This module defines the three capability interfaces of the cache core:
//! the binary data store, the store factory and the value serializer.
//! Upper layers only ever see these traits, so backends can be swapped
//! without breaking callers.

use std::sync::Arc;

use crate::descriptor::{ValueDescriptor, ValueIdentifier};
use crate::error::Result;
use crate::scope::CacheScope;
use crate::value::ComputedValue;

/// Identifier-keyed byte-blob store backing exactly one cache scope
///
/// Implementations must be internally thread-safe: one store instance is
/// shared (read/write) by all worker threads of its evaluation cycle.
/// For a single identifier, a read strictly after a completed write must
/// observe that write; no ordering is guaranteed between identifiers.
pub trait BinaryDataStore: Send + Sync {
    /// Get the bytes stored for an identifier
    ///
    /// Returns `Ok(None)` when no entry exists — a cache miss, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage read fails.
    fn get(&self, id: ValueIdentifier) -> Result<Option<Vec<u8>>>;

    /// Store bytes for an identifier, fully replacing any prior entry
    ///
    /// A write either fully replaces the prior bytes or is not observed;
    /// partial application is never visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage write fails.
    fn put(&self, id: ValueIdentifier, bytes: &[u8]) -> Result<()>;

    /// Drop every entry in this store
    ///
    /// Called when the owning scope is released.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn remove_all(&self) -> Result<()>;
}

/// Opens or creates the binary data store for a cache scope
///
/// Deterministic per scope: the same scope always yields a store over the
/// same underlying data until that data is explicitly dropped. Must be safe
/// to call concurrently for different scopes sharing one environment.
pub trait BinaryDataStoreFactory: Send + Sync {
    /// Open the store for a scope, creating its backing data if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be opened or created.
    fn open_or_create(&self, scope: &CacheScope) -> Result<Arc<dyn BinaryDataStore>>;

    /// Durable descriptor → identifier assignments shared by this
    /// factory's stores, when the backend keeps any
    ///
    /// Stores key entries by identifier, so a backend whose data outlives
    /// the process must also keep the assignments that make those keys
    /// resolvable. Backends without cross-process data return `None`.
    fn identifier_store(&self) -> Option<Arc<dyn IdentifierStore>> {
        None
    }
}

/// Durable record of descriptor → identifier assignments
///
/// Every assignment is recorded before it becomes visible, so data keyed by
/// an identifier can always be traced back to its descriptor after a
/// process restart. Assignments are never removed: identifiers belong to
/// the environment, not to any scope.
pub trait IdentifierStore: Send + Sync {
    /// Load every recorded assignment
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage read fails or a recorded
    /// descriptor cannot be decoded.
    fn load_all(&self) -> Result<Vec<(ValueDescriptor, ValueIdentifier)>>;

    /// Record one assignment
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage write fails.
    fn record(&self, descriptor: &ValueDescriptor, id: ValueIdentifier) -> Result<()>;
}

/// Encodes computed values to bytes and back
///
/// The byte payload is opaque to the cache; serializer failures surface as
/// serialization errors, never as cache or storage errors, and are not
/// retried.
pub trait ValueSerializer: Send + Sync {
    /// Encode a value to bytes
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the value cannot be encoded.
    fn serialize(&self, value: &ComputedValue) -> Result<Vec<u8>>;

    /// Decode a value from bytes previously produced by `serialize`
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the bytes cannot be decoded.
    fn deserialize(&self, bytes: &[u8]) -> Result<ComputedValue>;
}
