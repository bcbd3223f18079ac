//! Persistent binary data store
//!
//! The persistent backend is built on an embedded transactional key-value
//! engine (redb). One physical environment per process holds one logical
//! table per cache scope, keeping scopes isolated and independently
//! droppable. Identifiers key the table directly as raw `u64`s; values are
//! the opaque serialized payloads.

use std::sync::Arc;

use redb::{Durability, ReadableTable, TableDefinition, TableError};
use tracing::debug;

use viewcache_core::{
    BinaryDataStore, BinaryDataStoreFactory, CacheError, CacheScope, DurabilityMode,
    IdentifierStore, Result, ValueDescriptor, ValueIdentifier,
};

use crate::environment::StorageEnvironment;

/// Dedicated table holding descriptor → identifier assignments.
///
/// Scope table names always contain the storage-key separator, so a bare
/// name can never collide with one.
const IDENTIFIER_TABLE: TableDefinition<&[u8], u64> = TableDefinition::new("identifiers");

fn commit_durability(mode: DurabilityMode) -> Durability {
    match mode {
        DurabilityMode::Transactional => Durability::Immediate,
        DurabilityMode::NonTransactional => Durability::Eventual,
    }
}

/// Binary data store over one named table of the shared environment
///
/// Writes run in short write transactions, so a `put` either fully
/// replaces the prior bytes or is not observed. The engine serializes
/// writers internally; readers never block writers.
pub struct PersistentBinaryStore {
    env: Arc<StorageEnvironment>,
    table_name: String,
    durability: DurabilityMode,
}

impl PersistentBinaryStore {
    fn new(env: Arc<StorageEnvironment>, scope: &CacheScope, durability: DurabilityMode) -> Self {
        Self {
            env,
            table_name: scope.storage_key(),
            durability,
        }
    }

    fn table_def(&self) -> TableDefinition<'_, u64, &'static [u8]> {
        TableDefinition::new(&self.table_name)
    }
}

impl BinaryDataStore for PersistentBinaryStore {
    fn get(&self, id: ValueIdentifier) -> Result<Option<Vec<u8>>> {
        let txn = self
            .env
            .database()
            .begin_read()
            .map_err(CacheError::storage)?;

        // A scope whose table has never been written is simply empty
        let table = match txn.open_table(self.table_def()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(other) => return Err(CacheError::storage(other)),
        };

        let bytes = table
            .get(id.as_u64())
            .map_err(CacheError::storage)?
            .map(|guard| guard.value().to_vec());
        Ok(bytes)
    }

    fn put(&self, id: ValueIdentifier, bytes: &[u8]) -> Result<()> {
        let mut txn = self
            .env
            .database()
            .begin_write()
            .map_err(CacheError::storage)?;
        txn.set_durability(commit_durability(self.durability));
        {
            let mut table = txn
                .open_table(self.table_def())
                .map_err(CacheError::storage)?;
            table.insert(id.as_u64(), bytes).map_err(CacheError::storage)?;
        }
        txn.commit().map_err(CacheError::storage)?;
        Ok(())
    }

    fn remove_all(&self) -> Result<()> {
        let mut txn = self
            .env
            .database()
            .begin_write()
            .map_err(CacheError::storage)?;
        txn.set_durability(commit_durability(self.durability));
        txn.delete_table(self.table_def())
            .map_err(CacheError::storage)?;
        txn.commit().map_err(CacheError::storage)?;
        Ok(())
    }
}

/// Durable descriptor → identifier assignments inside the environment
///
/// Keyed by the serialized descriptor so load can rebuild the full mapping
/// after a restart. An assignment is recorded before any data is written
/// under its identifier; both run at the same commit durability, and redb
/// commits are ordered, so data that survives a crash always has a
/// surviving assignment.
pub struct PersistentIdentifierStore {
    env: Arc<StorageEnvironment>,
    durability: DurabilityMode,
}

impl PersistentIdentifierStore {
    fn new(env: Arc<StorageEnvironment>, durability: DurabilityMode) -> Self {
        Self { env, durability }
    }
}

impl IdentifierStore for PersistentIdentifierStore {
    fn load_all(&self) -> Result<Vec<(ValueDescriptor, ValueIdentifier)>> {
        let txn = self
            .env
            .database()
            .begin_read()
            .map_err(CacheError::storage)?;

        // A fresh environment has no assignments yet
        let table = match txn.open_table(IDENTIFIER_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(other) => return Err(CacheError::storage(other)),
        };

        let mut assignments = Vec::new();
        for entry in table.iter().map_err(CacheError::storage)? {
            let (key, value) = entry.map_err(CacheError::storage)?;
            let descriptor =
                bincode::deserialize(key.value()).map_err(CacheError::serialization)?;
            assignments.push((descriptor, ValueIdentifier::new(value.value())));
        }
        Ok(assignments)
    }

    fn record(&self, descriptor: &ValueDescriptor, id: ValueIdentifier) -> Result<()> {
        let key = bincode::serialize(descriptor).map_err(CacheError::serialization)?;
        let mut txn = self
            .env
            .database()
            .begin_write()
            .map_err(CacheError::storage)?;
        txn.set_durability(commit_durability(self.durability));
        {
            let mut table = txn
                .open_table(IDENTIFIER_TABLE)
                .map_err(CacheError::storage)?;
            table
                .insert(key.as_slice(), id.as_u64())
                .map_err(CacheError::storage)?;
        }
        txn.commit().map_err(CacheError::storage)?;
        Ok(())
    }
}

/// Factory handing out persistent stores over one shared environment
///
/// Construction opens (or recovers) the storage environment; see
/// [`StorageEnvironment::open`] for the recovery policy. Opening stores for
/// different scopes concurrently is safe: each store is a view over its own
/// table.
pub struct PersistentStoreFactory {
    env: Arc<StorageEnvironment>,
    durability: DurabilityMode,
}

impl PersistentStoreFactory {
    /// Open the environment at `root` and build a factory over it
    ///
    /// # Errors
    ///
    /// Propagates environment-open failures, including the fatal
    /// `EnvironmentUnavailable` after a failed recovery.
    pub fn open(root: impl AsRef<std::path::Path>, durability: DurabilityMode) -> Result<Self> {
        let env = Arc::new(StorageEnvironment::open(root)?);
        Ok(Self::with_environment(env, durability))
    }

    /// Build a factory over an already-open environment
    pub fn with_environment(env: Arc<StorageEnvironment>, durability: DurabilityMode) -> Self {
        Self { env, durability }
    }

    /// The environment this factory hands out stores over
    pub fn environment(&self) -> &Arc<StorageEnvironment> {
        &self.env
    }
}

impl BinaryDataStoreFactory for PersistentStoreFactory {
    fn open_or_create(&self, scope: &CacheScope) -> Result<Arc<dyn BinaryDataStore>> {
        debug!(scope = %scope, "opening persistent store");
        Ok(Arc::new(PersistentBinaryStore::new(
            Arc::clone(&self.env),
            scope,
            self.durability,
        )))
    }

    fn identifier_store(&self) -> Option<Arc<dyn IdentifierStore>> {
        Some(Arc::new(PersistentIdentifierStore::new(
            Arc::clone(&self.env),
            self.durability,
        )))
    }
}
