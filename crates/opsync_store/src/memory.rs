//! In-memory store implementation.

use crate::error::StoreResult;
use crate::store::{ChangedEntry, Store, StoreTransaction};
use crate::types::{ClientId, SpaceId, Version};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// A stored entry: the value (or a tombstone) plus the version that wrote it.
#[derive(Debug, Clone, PartialEq)]
struct VersionedEntry {
    /// The entry value; `None` for a tombstone.
    value: Option<Vec<u8>>,
    /// The version of the batch that produced this state.
    version: u64,
}

/// Committed state.
#[derive(Debug, Default)]
struct MemoryInner {
    /// Space id -> current version.
    versions: HashMap<SpaceId, u64>,
    /// Client id -> last applied mutation id.
    sequences: HashMap<ClientId, u64>,
    /// (space, key) -> entry. BTreeMap keeps incremental reads in key order.
    entries: BTreeMap<(SpaceId, String), VersionedEntry>,
}

/// Writes buffered by one transaction, applied only on commit.
#[derive(Debug, Default)]
struct PendingWrites {
    versions: HashMap<SpaceId, u64>,
    sequences: HashMap<ClientId, u64>,
    entries: BTreeMap<(SpaceId, String), VersionedEntry>,
}

impl PendingWrites {
    fn is_empty(&self) -> bool {
        self.versions.is_empty() && self.sequences.is_empty() && self.entries.is_empty()
    }
}

/// An in-memory [`Store`].
///
/// Suitable for unit tests, integration tests and ephemeral deployments that
/// don't need persistence.
///
/// # Isolation
///
/// Transactions are mutually exclusive: `transact` holds one lock for the
/// whole read-check-apply-write sequence, which makes every schedule
/// serializable. Writes are buffered per transaction and applied on commit,
/// so a transaction that returns `Err` leaves no trace.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries across all spaces, tombstones included.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.inner.lock().entries.len()
    }

    fn apply(inner: &mut MemoryInner, pending: PendingWrites) {
        for (space, version) in pending.versions {
            inner.versions.insert(space, version);
        }
        for (client, id) in pending.sequences {
            inner.sequences.insert(client, id);
        }
        for (key, entry) in pending.entries {
            inner.entries.insert(key, entry);
        }
    }
}

impl Store for MemoryStore {
    fn transact<T>(
        &self,
        f: impl FnOnce(&mut dyn StoreTransaction) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut inner = self.inner.lock();

        let (result, pending) = {
            let mut txn = MemoryTransaction {
                base: &*inner,
                pending: PendingWrites::default(),
            };
            let result = f(&mut txn);
            (result, txn.pending)
        };

        match result {
            Ok(value) => {
                if !pending.is_empty() {
                    Self::apply(&mut *inner, pending);
                }
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }
}

/// One open transaction: committed state plus this transaction's own writes.
struct MemoryTransaction<'a> {
    base: &'a MemoryInner,
    pending: PendingWrites,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn version(&mut self, space: &SpaceId) -> StoreResult<Option<Version>> {
        let version = self
            .pending
            .versions
            .get(space)
            .or_else(|| self.base.versions.get(space))
            .copied();
        Ok(version.map(Version::new))
    }

    fn set_version(&mut self, space: &SpaceId, version: Version) -> StoreResult<()> {
        self.pending.versions.insert(space.clone(), version.as_u64());
        Ok(())
    }

    fn last_mutation_id(&mut self, client: &ClientId) -> StoreResult<Option<u64>> {
        let id = self
            .pending
            .sequences
            .get(client)
            .or_else(|| self.base.sequences.get(client))
            .copied();
        Ok(id)
    }

    fn set_last_mutation_id(&mut self, client: &ClientId, id: u64) -> StoreResult<()> {
        self.pending.sequences.insert(client.clone(), id);
        Ok(())
    }

    fn entry(&mut self, space: &SpaceId, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let lookup = (space.clone(), key.to_string());
        let entry = self
            .pending
            .entries
            .get(&lookup)
            .or_else(|| self.base.entries.get(&lookup));
        Ok(entry.and_then(|e| e.value.clone()))
    }

    fn put_entry(
        &mut self,
        space: &SpaceId,
        key: &str,
        value: &[u8],
        version: Version,
    ) -> StoreResult<()> {
        self.pending.entries.insert(
            (space.clone(), key.to_string()),
            VersionedEntry {
                value: Some(value.to_vec()),
                version: version.as_u64(),
            },
        );
        Ok(())
    }

    fn del_entry(&mut self, space: &SpaceId, key: &str, version: Version) -> StoreResult<()> {
        self.pending.entries.insert(
            (space.clone(), key.to_string()),
            VersionedEntry {
                value: None,
                version: version.as_u64(),
            },
        );
        Ok(())
    }

    fn entries_since(
        &mut self,
        space: &SpaceId,
        since: Version,
    ) -> StoreResult<Vec<ChangedEntry>> {
        // Overlay this transaction's writes on the committed state.
        let mut merged: BTreeMap<&str, &VersionedEntry> = BTreeMap::new();
        for ((s, key), entry) in &self.base.entries {
            if s == space {
                merged.insert(key.as_str(), entry);
            }
        }
        for ((s, key), entry) in &self.pending.entries {
            if s == space {
                merged.insert(key.as_str(), entry);
            }
        }

        Ok(merged
            .into_iter()
            .filter(|(_, entry)| entry.version > since.as_u64())
            .map(|(key, entry)| ChangedEntry {
                key: key.to_string(),
                version: Version::new(entry.version),
                value: entry.value.clone(),
            })
            .collect())
    }
}
