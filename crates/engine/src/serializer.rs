//! Default value serializer
//!
//! The cache treats payloads as opaque bytes; this is the in-tree
//! serializer for deployments that do not bring their own. Uses bincode
//! over the serde representation of `ComputedValue`.

use viewcache_core::{CacheError, ComputedValue, Result, ValueSerializer};

/// Bincode-backed implementation of the serializer seam
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeValueSerializer;

impl BincodeValueSerializer {
    /// Create the serializer
    pub fn new() -> Self {
        Self
    }
}

impl ValueSerializer for BincodeValueSerializer {
    fn serialize(&self, value: &ComputedValue) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(CacheError::serialization)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<ComputedValue> {
        bincode::deserialize(bytes).map_err(CacheError::serialization)
    }
}
