//! Cache configuration
//!
//! Recognized options: in-memory vs persistent backend selection, the root
//! directory for the persistent backend, and its durability mode.

use std::path::{Path, PathBuf};

/// Durability mode for the persistent backend
///
/// Controls whether each `put` is fsynced before the write is acknowledged.
/// Affects crash survivability of entries already written, not correctness:
/// the cache never promises long-term durability either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// fsync on every commit. Entries already `put` survive a crash.
    Transactional,
    /// Defer fsync to the engine. Fastest; recent writes may be lost on
    /// crash, which the cache contract permits.
    #[default]
    NonTransactional,
}

impl DurabilityMode {
    /// Human-readable description of the mode
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::Transactional => "fsync per commit (crash-survivable entries)",
            DurabilityMode::NonTransactional => "deferred fsync (fast, may lose recent writes)",
        }
    }
}

/// Physical backend for the binary data stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// Concurrent in-process map; all data lost when the process exits
    InMemory,
    /// Embedded persistent key-value engine on local disk
    Persistent {
        /// Root directory of the storage environment
        root: PathBuf,
        /// Commit durability for writes
        durability: DurabilityMode,
    },
}

/// Configuration for a computation cache source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Selected physical backend
    pub backend: CacheBackend,
}

impl CacheConfig {
    /// Pure in-memory caching, no cross-process sharing
    pub fn in_memory() -> Self {
        Self {
            backend: CacheBackend::InMemory,
        }
    }

    /// Persistent caching rooted at `root`, with default durability
    pub fn persistent(root: impl AsRef<Path>) -> Self {
        Self::persistent_with_durability(root, DurabilityMode::default())
    }

    /// Persistent caching with an explicit durability mode
    pub fn persistent_with_durability(root: impl AsRef<Path>, durability: DurabilityMode) -> Self {
        Self {
            backend: CacheBackend::Persistent {
                root: root.as_ref().to_path_buf(),
                durability,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_durability_is_non_transactional() {
        assert_eq!(DurabilityMode::default(), DurabilityMode::NonTransactional);
    }

    #[test]
    fn test_in_memory_config() {
        let config = CacheConfig::in_memory();
        assert_eq!(config.backend, CacheBackend::InMemory);
    }

    #[test]
    fn test_persistent_config_captures_root_and_durability() {
        let config =
            CacheConfig::persistent_with_durability("/tmp/vc", DurabilityMode::Transactional);
        match config.backend {
            CacheBackend::Persistent { root, durability } => {
                assert_eq!(root, PathBuf::from("/tmp/vc"));
                assert_eq!(durability, DurabilityMode::Transactional);
            }
            CacheBackend::InMemory => panic!("expected persistent backend"),
        }
    }

    #[test]
    fn test_descriptions_are_distinct() {
        assert_ne!(
            DurabilityMode::Transactional.description(),
            DurabilityMode::NonTransactional.description()
        );
    }
}
