//! Storage environment lifecycle
//!
//! A StorageEnvironment is the physical resource backing every persistent
//! binary data store of a process: one root directory holding one embedded
//! database file. Exactly one process may hold an environment open at a
//! time; the embedded engine enforces this with a file lock.
//!
//! Opening can fail with a locked-environment condition when a prior
//! process crashed and left a stale lock, or when the engine reports the
//! file as damaged. The recovery policy is: destroy the entire directory
//! tree, recreate it, and retry the open exactly once. A second failure is
//! fatal. This destructive recovery is safe only because the environment
//! holds cache data, never authoritative state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use redb::{Database, DatabaseError, StorageError};
use tracing::{debug, warn};

use viewcache_core::{CacheError, Result};

/// Name of the database file inside the environment root
const DATA_FILE: &str = "cache.redb";

type OpenOutcome = std::result::Result<Database, DatabaseError>;

/// Physical resource backing the persistent binary data stores
///
/// Owns the root directory and the single embedded database of a process.
/// Dropping the environment closes the database and releases its lock.
#[derive(Debug)]
pub struct StorageEnvironment {
    root: PathBuf,
    database: Database,
}

impl StorageEnvironment {
    /// Open the environment rooted at `root`, creating it if absent
    ///
    /// Directory creation is idempotent. A locked or damaged environment
    /// is destroyed and re-opened once; see the module documentation for
    /// the recovery policy.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::EnvironmentUnavailable` if the retry after
    /// recovery also fails, `CacheError::Storage` for open failures that
    /// recovery cannot help with, or an I/O error if the directory itself
    /// cannot be created or destroyed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(root.as_ref(), |path| Database::create(path))
    }

    /// Open with an injectable database opener
    ///
    /// The opener seam exists so tests can simulate lock conflicts
    /// deterministically; `open` passes the real engine opener.
    pub(crate) fn open_with(
        root: &Path,
        mut opener: impl FnMut(&Path) -> OpenOutcome,
    ) -> Result<Self> {
        fs::create_dir_all(root)?;
        let data_path = root.join(DATA_FILE);

        let first_failure = match opener(&data_path) {
            Ok(database) => {
                return Ok(Self {
                    root: root.to_path_buf(),
                    database,
                })
            }
            Err(err) => classify_open_error(err, root),
        };

        let CacheError::EnvironmentLocked { detail, .. } = &first_failure else {
            return Err(first_failure);
        };

        warn!(
            path = %root.display(),
            detail = %detail,
            "storage environment locked or damaged, destroying and retrying once"
        );
        destroy_environment(root)?;

        match opener(&data_path) {
            Ok(database) => {
                debug!(path = %root.display(), "storage environment recovered");
                Ok(Self {
                    root: root.to_path_buf(),
                    database,
                })
            }
            Err(err) => Err(CacheError::EnvironmentUnavailable {
                path: root.to_path_buf(),
                detail: err.to_string(),
            }),
        }
    }

    /// Root directory of this environment
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle to the embedded database
    pub(crate) fn database(&self) -> &Database {
        &self.database
    }
}

/// Classify an engine open failure
///
/// Lock conflicts (stale lock from a crashed process, or a second handle on
/// the same file) and engine-reported damage are recoverable by destroying
/// the environment. Anything else, such as permission errors, is a plain
/// storage failure that destruction would not fix.
fn classify_open_error(err: DatabaseError, root: &Path) -> CacheError {
    let recoverable = match &err {
        DatabaseError::DatabaseAlreadyOpen => true,
        DatabaseError::RepairAborted => true,
        DatabaseError::Storage(StorageError::Corrupted(_)) => true,
        DatabaseError::Storage(StorageError::Io(io_err)) => {
            io_err.kind() == ErrorKind::WouldBlock
        }
        _ => false,
    };

    if recoverable {
        CacheError::EnvironmentLocked {
            path: root.to_path_buf(),
            detail: err.to_string(),
        }
    } else {
        CacheError::storage(err)
    }
}

/// Destroy an environment's directory tree and recreate it empty
///
/// The sole recovery mechanism for a locked environment. Destructive by
/// design: every cached entry under `root` is lost.
fn destroy_environment(root: &Path) -> Result<()> {
    fs::remove_dir_all(root)?;
    fs::create_dir_all(root)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;

    fn locked_error() -> DatabaseError {
        DatabaseError::DatabaseAlreadyOpen
    }

    fn permission_error() -> DatabaseError {
        DatabaseError::Storage(StorageError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "access denied",
        )))
    }

    #[test]
    fn test_open_creates_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("env");

        let env = StorageEnvironment::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(env.root(), root.as_path());
        assert!(root.join(DATA_FILE).exists());
    }

    #[test]
    fn test_open_is_idempotent_on_existing_environment() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("env");

        drop(StorageEnvironment::open(&root).unwrap());
        // Second open of the released environment succeeds over the same file
        let env = StorageEnvironment::open(&root).unwrap();
        assert_eq!(env.root(), root.as_path());
    }

    #[test]
    fn test_lock_conflict_destroys_and_retries_once() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("env");
        fs::create_dir_all(&root).unwrap();
        let stale_marker = root.join("stale.lock");
        fs::write(&stale_marker, b"left by a crashed process").unwrap();

        let attempts = Cell::new(0u32);
        let env = StorageEnvironment::open_with(&root, |path| {
            attempts.set(attempts.get() + 1);
            if attempts.get() == 1 {
                Err(locked_error())
            } else {
                Database::create(path)
            }
        })
        .unwrap();

        assert_eq!(attempts.get(), 2);
        // Recovery wiped the directory tree, including the stale marker
        assert!(!stale_marker.exists());
        assert!(env.root().is_dir());
    }

    #[test]
    fn test_second_failure_is_fatal_not_a_loop() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("env");

        let attempts = Cell::new(0u32);
        let err = StorageEnvironment::open_with(&root, |_| {
            attempts.set(attempts.get() + 1);
            Err(locked_error())
        })
        .unwrap_err();

        // Exactly one destroy-and-retry cycle: two open attempts total
        assert_eq!(attempts.get(), 2);
        assert!(err.is_fatal());
        assert!(matches!(err, CacheError::EnvironmentUnavailable { .. }));
    }

    #[test]
    fn test_unrecoverable_failure_does_not_destroy_the_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("env");
        fs::create_dir_all(&root).unwrap();
        let marker = root.join("keep.me");
        fs::write(&marker, b"not cache data").unwrap();

        let attempts = Cell::new(0u32);
        let err = StorageEnvironment::open_with(&root, |_| {
            attempts.set(attempts.get() + 1);
            Err(permission_error())
        })
        .unwrap_err();

        // No retry, no destruction for failures recovery cannot fix
        assert_eq!(attempts.get(), 1);
        assert!(matches!(err, CacheError::Storage(_)));
        assert!(marker.exists());
    }

    #[test]
    fn test_corruption_is_classified_as_recoverable() {
        let err = classify_open_error(
            DatabaseError::Storage(StorageError::Corrupted("bad checksum".to_string())),
            Path::new("/tmp/env"),
        );
        assert!(matches!(err, CacheError::EnvironmentLocked { .. }));
    }

    #[test]
    fn test_stale_flock_is_classified_as_recoverable() {
        let err = classify_open_error(
            DatabaseError::Storage(StorageError::Io(io::Error::new(
                io::ErrorKind::WouldBlock,
                "file is locked",
            ))),
            Path::new("/tmp/env"),
        );
        assert!(matches!(err, CacheError::EnvironmentLocked { .. }));
    }

    #[test]
    fn test_permission_error_is_not_recoverable() {
        let err = classify_open_error(permission_error(), Path::new("/tmp/env"));
        assert!(matches!(err, CacheError::Storage(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_environment_error_diagnostics_name_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("env");

        let err = StorageEnvironment::open_with(&root, |_| Err(locked_error())).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("env"));
        assert!(msg.contains("unavailable after recovery"));
    }
}
