//! Transactional executor and transaction-handle traits.

use crate::error::StoreResult;
use crate::types::{ClientId, SpaceId, Version};

/// A change to one entry, as observed by "changed since version V" reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedEntry {
    /// Entry key.
    pub key: String,
    /// The version that produced this state of the entry.
    pub version: Version,
    /// The entry's value; `None` for a tombstone.
    pub value: Option<Vec<u8>>,
}

impl ChangedEntry {
    /// Returns true if this change is a deletion.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }
}

/// The handle a transaction body runs against.
///
/// All reads observe the transaction's isolation snapshot plus the
/// transaction's own uncommitted writes; all writes are atomic with the
/// enclosing [`Store::transact`] call.
///
/// # Invariants
///
/// - `version` returns `None` exactly when the space does not exist
/// - `last_mutation_id` returns `None` for clients never seen before
/// - `put_entry`/`del_entry` record the given version alongside the value or
///   tombstone, so `entries_since` can answer incremental reads
/// - An entry overwritten within one transaction keeps only the last write
pub trait StoreTransaction {
    /// Returns the current version of a space, or `None` if it does not exist.
    fn version(&mut self, space: &SpaceId) -> StoreResult<Option<Version>>;

    /// Sets the version of a space, creating the space if missing.
    fn set_version(&mut self, space: &SpaceId, version: Version) -> StoreResult<()>;

    /// Returns the last applied mutation id for a client, or `None` if the
    /// client has never been seen.
    fn last_mutation_id(&mut self, client: &ClientId) -> StoreResult<Option<u64>>;

    /// Sets the last applied mutation id for a client.
    fn set_last_mutation_id(&mut self, client: &ClientId, id: u64) -> StoreResult<()>;

    /// Returns the live value of an entry, or `None` if absent or deleted.
    fn entry(&mut self, space: &SpaceId, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Writes an entry value tagged with the given version.
    fn put_entry(
        &mut self,
        space: &SpaceId,
        key: &str,
        value: &[u8],
        version: Version,
    ) -> StoreResult<()>;

    /// Deletes an entry, leaving a tombstone tagged with the given version.
    fn del_entry(&mut self, space: &SpaceId, key: &str, version: Version) -> StoreResult<()>;

    /// Returns all entries of a space whose version is greater than `since`,
    /// tombstones included, in key order.
    fn entries_since(&mut self, space: &SpaceId, since: Version)
        -> StoreResult<Vec<ChangedEntry>>;
}

/// A transactional executor over durable state.
///
/// `transact` runs the closure against a fresh transaction handle and commits
/// if the closure returns `Ok`; an `Err` aborts the transaction and nothing is
/// persisted. The store must provide serializable (or stricter) isolation
/// between concurrent `transact` calls: two batches gated on the same client
/// sequence record must never both observe the old value and both advance it.
///
/// Retry on serialization conflict is the caller's policy, not the store's.
pub trait Store: Send + Sync {
    /// Runs `f` inside one transaction with atomic commit/abort.
    fn transact<T>(
        &self,
        f: impl FnOnce(&mut dyn StoreTransaction) -> StoreResult<T>,
    ) -> StoreResult<T>;
}
