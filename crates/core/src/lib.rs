//! Core types and traits for the computation value cache
//!
//! This crate defines the foundational types used throughout the system:
//! - TargetRef / ValueDescriptor: logical keys for computed values
//! - ValueIdentifier: compact process-local substitute for a descriptor
//! - CacheScope: isolation unit for one evaluation cycle
//! - ComputedValue: value model crossing the serializer boundary
//! - CacheError: error type hierarchy
//! - Traits: BinaryDataStore, BinaryDataStoreFactory, ValueSerializer
//! - CacheConfig: backend selection and durability

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod scope;
pub mod traits;
pub mod value;

// Re-export commonly used types and traits
pub use config::{CacheBackend, CacheConfig, DurabilityMode};
pub use descriptor::{TargetRef, ValueDescriptor, ValueIdentifier};
pub use error::{CacheError, Result};
pub use scope::CacheScope;
pub use traits::{BinaryDataStore, BinaryDataStoreFactory, IdentifierStore, ValueSerializer};
pub use value::ComputedValue;
