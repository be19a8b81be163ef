//! Mutator registry.
//!
//! Mutators are the named operations clients submit. The same mutator code
//! runs optimistically on clients and authoritatively here; handlers must
//! therefore be pure with respect to anything outside the storage view they
//! are given - no ambient I/O, no clock or randomness that a replay could not
//! reproduce.

use opsync_store::{StoreError, VersionedWrite};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Result type for mutator execution.
pub type MutatorResult = Result<(), MutatorError>;

/// Typed failure of one mutator invocation.
///
/// Every variant except [`MutatorError::Store`] is non-fatal to the batch:
/// the engine logs it and moves on, still advancing the client's sequence
/// number. A storage failure aborts the whole transaction instead.
#[derive(Debug, Error)]
pub enum MutatorError {
    /// The arguments did not have the shape this mutator expects.
    #[error("invalid arguments: {message}")]
    InvalidArgs {
        /// Description of the mismatch.
        message: String,
    },

    /// The storage layer failed underneath the mutator.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The mutator's own logic failed.
    #[error("mutator failed: {message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },
}

impl MutatorError {
    /// Creates an invalid-arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs {
            message: message.into(),
        }
    }

    /// Creates a mutator-failed error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// A registered mutator: storage view plus opaque JSON arguments.
pub type MutatorFn = dyn Fn(&mut VersionedWrite<'_>, &Value) -> MutatorResult + Send + Sync;

/// Lookup table from mutator name to handler.
///
/// Built once at startup and shared across requests. Names not present here
/// resolve to the engine's no-op + log path, never a crash: an unrecognized
/// mutation from a newer client version is skipped, not fatal.
#[derive(Default)]
pub struct MutatorRegistry {
    mutators: HashMap<String, Box<MutatorFn>>,
}

impl MutatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mutator under `name`, replacing any previous registration.
    pub fn register<F>(&mut self, name: impl Into<String>, mutator: F)
    where
        F: Fn(&mut VersionedWrite<'_>, &Value) -> MutatorResult + Send + Sync + 'static,
    {
        self.mutators.insert(name.into(), Box::new(mutator));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, mutator: F) -> Self
    where
        F: Fn(&mut VersionedWrite<'_>, &Value) -> MutatorResult + Send + Sync + 'static,
    {
        self.register(name, mutator);
        self
    }

    /// Looks up a mutator by name.
    pub fn get(&self, name: &str) -> Option<&MutatorFn> {
        self.mutators.get(name).map(|m| m.as_ref())
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.mutators.contains_key(name)
    }

    /// Returns the number of registered mutators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mutators.len()
    }

    /// Returns true if no mutators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutators.is_empty()
    }
}

impl std::fmt::Debug for MutatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutatorRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsync_store::{MemoryStore, SpaceId, Store, Version};
    use serde_json::json;

    #[test]
    fn register_and_lookup() {
        let mut registry = MutatorRegistry::new();
        assert!(registry.is_empty());

        registry.register("noop", |_view, _args| Ok(()));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("noop"));
        assert!(registry.get("noop").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn builder_style_registration() {
        let registry = MutatorRegistry::new()
            .with("a", |_view, _args| Ok(()))
            .with("b", |_view, _args| Ok(()));

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn later_registration_wins() {
        let registry = MutatorRegistry::new()
            .with("m", |_view, _args| Err(MutatorError::failed("first")))
            .with("m", |_view, _args| Ok(()));

        assert_eq!(registry.len(), 1);

        let store = MemoryStore::new();
        store
            .transact(|tx| {
                let space = SpaceId::new("s1");
                let mut view = VersionedWrite::new(tx, &space, Version::new(1));
                let mutator = registry.get("m").unwrap();
                assert!(mutator(&mut view, &Value::Null).is_ok());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn mutator_writes_through_view() {
        let registry = MutatorRegistry::new().with("put", |view, args| {
            view.put("k", args)?;
            Ok(())
        });

        let store = MemoryStore::new();
        store
            .transact(|tx| {
                let space = SpaceId::new("s1");
                let mut view = VersionedWrite::new(tx, &space, Version::new(1));
                let mutator = registry.get("put").unwrap();
                mutator(&mut view, &json!(42)).unwrap();
                assert!(view.is_dirty());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn error_constructors() {
        assert!(MutatorError::invalid_args("want object")
            .to_string()
            .contains("want object"));
        assert!(MutatorError::failed("boom").to_string().contains("boom"));
    }
}
