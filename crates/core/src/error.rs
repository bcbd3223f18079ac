//! Error types for the computation value cache
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations. A cache miss is NOT an error: `get` operations return
//! `Ok(None)` for a miss and reserve `Err` for genuine failures.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Error type for the computation value cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error from the filesystem
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Value payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying binary data store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Storage environment is locked, typically by a stale lock left
    /// behind by a crashed process. Recoverable by destroying and
    /// recreating the environment once.
    #[error("Storage environment at {path:?} is locked: {detail}")]
    EnvironmentLocked {
        /// Root directory of the environment
        path: PathBuf,
        /// Underlying engine diagnostic
        detail: String,
    },

    /// Storage environment could not be opened even after destroying and
    /// recreating it. Fatal: the process cannot provide a persistent cache.
    #[error("Storage environment at {path:?} is unavailable after recovery: {detail}")]
    EnvironmentUnavailable {
        /// Root directory of the environment
        path: PathBuf,
        /// Underlying engine diagnostic
        detail: String,
    },

    /// The 64-bit identifier space has been exhausted. Fatal: the process
    /// cannot safely continue caching.
    #[error("Value identifier space exhausted")]
    IdentifierSpaceExhausted,
}

impl CacheError {
    /// Construct a serialization error from any displayable cause
    pub fn serialization(detail: impl std::fmt::Display) -> Self {
        CacheError::Serialization(detail.to_string())
    }

    /// Construct a storage error from any displayable cause
    pub fn storage(detail: impl std::fmt::Display) -> Self {
        CacheError::Storage(detail.to_string())
    }

    /// Whether this failure means the process cannot continue caching
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CacheError::EnvironmentUnavailable { .. } | CacheError::IdentifierSpaceExhausted
        )
    }

    /// Whether this is a storage-layer failure
    pub fn is_storage_error(&self) -> bool {
        matches!(self, CacheError::Storage(_))
    }
}
