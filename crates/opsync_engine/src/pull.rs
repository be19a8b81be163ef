//! Pull handling: incremental reads over version-tagged entries.

use crate::error::EngineResult;
use crate::push::Reconciler;
use opsync_protocol::{PatchOp, PullRequest, PullResponse};
use opsync_store::{ClientId, SpaceId, Store, StoreError, Version};
use tracing::debug;

impl<S: Store> Reconciler<S> {
    /// Answers "everything since cookie V" for one client.
    ///
    /// The cookie is the space version the client last saw; the response
    /// carries the current version as the next cookie, the client's last
    /// applied mutation id (so it can drop acknowledged optimistic
    /// mutations), and a patch of every entry whose version is greater than
    /// the cookie - deletions as `del`, everything else as `put`.
    ///
    /// Read-only: a pull never changes versions or sequence numbers.
    ///
    /// # Errors
    ///
    /// Fails on a pull from a space that does not exist, and on storage
    /// failure.
    pub fn handle_pull(&self, space: &SpaceId, request: &PullRequest) -> EngineResult<PullResponse> {
        debug!(
            "processing pull from {} at cookie {}",
            request.client_id, request.cookie
        );

        let client = ClientId::new(request.client_id.as_str());
        let response = self.store().transact(|tx| {
            let version = tx
                .version(space)?
                .ok_or_else(|| StoreError::unknown_space(space.as_str()))?;
            let last_mutation_id = tx.last_mutation_id(&client)?.unwrap_or(0);

            let changed = tx.entries_since(space, Version::new(request.cookie))?;
            let mut patch = Vec::with_capacity(changed.len());
            for entry in changed {
                match entry.value {
                    Some(bytes) => patch.push(PatchOp::Put {
                        key: entry.key,
                        value: serde_json::from_slice(&bytes)?,
                    }),
                    None => patch.push(PatchOp::Del { key: entry.key }),
                }
            }

            Ok(PullResponse::new(version.as_u64(), last_mutation_id, patch))
        })?;

        debug!(
            "processed pull from {}: cookie {} -> {}, {} patch ops",
            request.client_id,
            request.cookie,
            response.cookie,
            response.patch.len()
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineConfig, EngineError, MutatorRegistry};
    use opsync_protocol::{Mutation, PushRequest};
    use opsync_store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn space() -> SpaceId {
        SpaceId::new("s1")
    }

    fn create_engine() -> Reconciler<MemoryStore> {
        let registry = MutatorRegistry::new()
            .with("put", |view, args| {
                let key = args["key"].as_str().unwrap_or_default();
                view.put(key, &args["value"])?;
                Ok(())
            })
            .with("del", |view, args| {
                view.delete(args.as_str().unwrap_or_default())?;
                Ok(())
            });

        let engine = Reconciler::new(
            Arc::new(MemoryStore::new()),
            Arc::new(registry),
            EngineConfig::default(),
        );
        engine.create_space(&space()).unwrap();
        engine
    }

    fn put(id: u64, key: &str, value: serde_json::Value) -> Mutation {
        Mutation::new(id, "put", json!({ "key": key, "value": value }))
    }

    #[test]
    fn fresh_client_pulls_everything() {
        let engine = create_engine();
        engine
            .handle_push(
                &space(),
                &PushRequest::new("c1", vec![put(1, "a", json!(1)), put(2, "b", json!(2))]),
            )
            .unwrap();

        let response = engine
            .handle_pull(&space(), &PullRequest::new("c1", 0))
            .unwrap();

        assert_eq!(response.cookie, 1);
        assert_eq!(response.last_mutation_id, 2);
        assert_eq!(
            response.patch,
            vec![
                PatchOp::Put {
                    key: "a".into(),
                    value: json!(1)
                },
                PatchOp::Put {
                    key: "b".into(),
                    value: json!(2)
                },
            ]
        );
    }

    #[test]
    fn caught_up_client_pulls_nothing() {
        let engine = create_engine();
        engine
            .handle_push(&space(), &PushRequest::new("c1", vec![put(1, "a", json!(1))]))
            .unwrap();

        let response = engine
            .handle_pull(&space(), &PullRequest::new("c1", 1))
            .unwrap();

        assert_eq!(response.cookie, 1);
        assert!(response.patch.is_empty());
    }

    #[test]
    fn deletion_pulls_as_del() {
        let engine = create_engine();
        engine
            .handle_push(&space(), &PushRequest::new("c1", vec![put(1, "a", json!(1))]))
            .unwrap();
        engine
            .handle_push(
                &space(),
                &PushRequest::new("c1", vec![Mutation::new(2, "del", json!("a"))]),
            )
            .unwrap();

        // A client that saw version 1 gets the deletion.
        let response = engine
            .handle_pull(&space(), &PullRequest::new("c1", 1))
            .unwrap();
        assert_eq!(response.cookie, 2);
        assert_eq!(response.patch, vec![PatchOp::Del { key: "a".into() }]);
    }

    #[test]
    fn other_clients_sequence_is_not_leaked() {
        let engine = create_engine();
        engine
            .handle_push(&space(), &PushRequest::new("c1", vec![put(1, "a", json!(1))]))
            .unwrap();

        let response = engine
            .handle_pull(&space(), &PullRequest::new("c2", 0))
            .unwrap();

        // c2 has applied nothing even though c1 has.
        assert_eq!(response.last_mutation_id, 0);
        assert_eq!(response.patch.len(), 1);
    }

    #[test]
    fn pull_from_unknown_space_fails() {
        let engine = create_engine();

        let result = engine.handle_pull(&SpaceId::new("nowhere"), &PullRequest::new("c1", 0));
        assert!(matches!(
            result,
            Err(EngineError::Store(StoreError::UnknownSpace { .. }))
        ));
    }
}
