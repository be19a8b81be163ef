//! Version-tagging write adapter.

use crate::error::StoreResult;
use crate::store::StoreTransaction;
use crate::types::{SpaceId, Version};
use serde_json::Value;

/// The storage view handed to mutators.
///
/// A `VersionedWrite` is scoped to one transaction, one space and one target
/// version fixed at construction: every `put`/`delete` records that version
/// alongside the value or tombstone. Reads return the latest value visible to
/// the enclosing transaction (its snapshot plus its own writes) - ordinary
/// transactional reads, not time travel.
///
/// Every mutating call marks the adapter dirty; the engine uses the flag to
/// decide whether the batch consumes a version number at all.
pub struct VersionedWrite<'a> {
    tx: &'a mut dyn StoreTransaction,
    space: &'a SpaceId,
    version: Version,
    dirty: bool,
}

impl<'a> VersionedWrite<'a> {
    /// Creates an adapter writing at `version`.
    pub fn new(tx: &'a mut dyn StoreTransaction, space: &'a SpaceId, version: Version) -> Self {
        Self {
            tx,
            space,
            version,
            dirty: false,
        }
    }

    /// The space this adapter is scoped to.
    #[must_use]
    pub fn space(&self) -> &SpaceId {
        self.space
    }

    /// The version every write is tagged with.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns true if any mutating call happened through this adapter.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the value under `key`, or `None` if absent or deleted.
    pub fn get(&mut self, key: &str) -> StoreResult<Option<Value>> {
        match self.tx.entry(self.space, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Returns true if `key` has a live value.
    pub fn has(&mut self, key: &str) -> StoreResult<bool> {
        Ok(self.tx.entry(self.space, key)?.is_some())
    }

    /// Creates or replaces the value under `key`.
    pub fn put(&mut self, key: &str, value: &Value) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.tx.put_entry(self.space, key, &bytes, self.version)?;
        self.dirty = true;
        Ok(())
    }

    /// Deletes the value under `key`, leaving a tombstone.
    pub fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.tx.del_entry(self.space, key, self.version)?;
        self.dirty = true;
        Ok(())
    }
}
