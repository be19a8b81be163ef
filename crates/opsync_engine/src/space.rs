//! Space management.
//!
//! A space is an isolated logical dataset with its own version counter,
//! entry namespace and client sequence records. Spaces must exist before
//! clients push to or pull from them.

use crate::error::EngineResult;
use crate::push::Reconciler;
use opsync_store::{SpaceId, Store, Version};
use tracing::info;

impl<S: Store> Reconciler<S> {
    /// Creates a space at version 0.
    ///
    /// Idempotent: returns `true` if the space was created, `false` if it
    /// already existed (in which case its version is untouched).
    pub fn create_space(&self, space: &SpaceId) -> EngineResult<bool> {
        let created = self.store().transact(|tx| {
            if tx.version(space)?.is_some() {
                return Ok(false);
            }
            tx.set_version(space, Version::new(0))?;
            Ok(true)
        })?;

        if created {
            info!("created {space}");
        }
        Ok(created)
    }

    /// Returns true if the space exists.
    pub fn space_exists(&self, space: &SpaceId) -> EngineResult<bool> {
        Ok(self.space_version(space)?.is_some())
    }

    /// Returns the space's current version, or `None` if it does not exist.
    pub fn space_version(&self, space: &SpaceId) -> EngineResult<Option<Version>> {
        Ok(self.store().transact(|tx| tx.version(space))?)
    }
}
