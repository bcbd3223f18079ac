//! Descriptor-to-identifier mapping
//!
//! Logical value descriptors are large, structured and repeat across
//! millions of lookups. The identifier map compresses each descriptor into
//! a compact `ValueIdentifier` exactly once per process, so stores key on
//! an 8-byte integer instead of the full descriptor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use viewcache_core::{CacheError, IdentifierStore, Result, ValueDescriptor, ValueIdentifier};

/// Bidirectional descriptor ↔ identifier mapping
///
/// One instance is shared by every cache of a process, amortizing the
/// mapping cost across evaluation cycles. Assignment is idempotent and
/// race-free: concurrent `get_or_assign` calls with the same descriptor
/// always return one identifier, and an identifier is never renumbered for
/// the lifetime of the map.
///
/// A map can optionally be backed by an [`IdentifierStore`]: assignments
/// made by prior processes over the same environment are loaded on
/// construction, and every new assignment is recorded durably before it
/// becomes visible. Without this, a persistent backend's data would be
/// unreachable (or worse, aliased to the wrong descriptor) after a restart.
pub struct IdentifierMap {
    forward: DashMap<ValueDescriptor, ValueIdentifier>,
    reverse: DashMap<ValueIdentifier, ValueDescriptor>,
    next: AtomicU64,
    durable: Option<Arc<dyn IdentifierStore>>,
}

impl Default for IdentifierMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierMap {
    /// Create an empty map with no durable backing
    pub fn new() -> Self {
        Self {
            forward: DashMap::new(),
            reverse: DashMap::new(),
            next: AtomicU64::new(0),
            durable: None,
        }
    }

    /// Create a map over durable assignments, loading any prior ones
    ///
    /// The counter resumes past the highest loaded identifier, so a
    /// restarted process never reuses an identifier that already keys
    /// on-disk data.
    ///
    /// # Errors
    ///
    /// Propagates load failures from the store.
    pub fn with_durable_store(store: Arc<dyn IdentifierStore>) -> Result<Self> {
        let forward = DashMap::new();
        let reverse = DashMap::new();
        let mut highest: Option<u64> = None;

        for (descriptor, id) in store.load_all()? {
            highest = Some(highest.map_or(id.as_u64(), |h| h.max(id.as_u64())));
            forward.insert(descriptor.clone(), id);
            reverse.insert(id, descriptor);
        }

        Ok(Self {
            forward,
            reverse,
            next: AtomicU64::new(highest.map_or(0, |h| h.saturating_add(1))),
            durable: Some(store),
        })
    }

    /// Get the identifier for a descriptor, assigning one if absent
    ///
    /// The concurrent map's entry lock makes the check-then-insert atomic
    /// per descriptor: exactly one caller wins a racing first assignment
    /// and every other caller observes the winner's identifier.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::IdentifierSpaceExhausted` when the 64-bit
    /// identifier space runs out, which is fatal for the process. A map
    /// with durable backing also propagates record failures; the
    /// assignment is then not made.
    pub fn get_or_assign(&self, descriptor: &ValueDescriptor) -> Result<ValueIdentifier> {
        // Fast path: already assigned
        if let Some(id) = self.forward.get(descriptor) {
            return Ok(*id);
        }

        match self.forward.entry(descriptor.clone()) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let id = ValueIdentifier::new(self.next_raw()?);
                // Record durably before the assignment becomes visible; on
                // failure the entry stays vacant and nothing was handed out
                if let Some(durable) = &self.durable {
                    durable.record(descriptor, id)?;
                }
                entry.insert(id);
                self.reverse.insert(id, descriptor.clone());
                Ok(id)
            }
        }
    }

    // CAS loop instead of fetch_add: the counter must saturate at the
    // sentinel rather than wrap and reissue identifiers.
    fn next_raw(&self) -> Result<u64> {
        let mut current = self.next.load(Ordering::SeqCst);
        loop {
            if current == u64::MAX {
                return Err(CacheError::IdentifierSpaceExhausted);
            }
            match self.next.compare_exchange(
                current,
                current + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Ok(current),
                Err(observed) => current = observed,
            }
        }
    }

    /// Look up the identifier for a descriptor without assigning one
    ///
    /// Used on the read path: a get for an unassigned descriptor is always
    /// a cache miss, never an assignment.
    pub fn get(&self, descriptor: &ValueDescriptor) -> Option<ValueIdentifier> {
        self.forward.get(descriptor).map(|id| *id)
    }

    /// Reverse lookup: the descriptor an identifier was assigned to
    pub fn descriptor_for(&self, id: ValueIdentifier) -> Option<ValueDescriptor> {
        self.reverse.get(&id).map(|d| d.clone())
    }

    /// Number of descriptors with an assigned identifier
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether no identifier has been assigned yet
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
