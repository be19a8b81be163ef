//! Push handling: the mutation-replay core.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::registry::{MutatorError, MutatorRegistry};
use opsync_protocol::PushRequest;
use opsync_store::{ClientId, SpaceId, Store, StoreError, Version, VersionedWrite};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// What one push batch did, for the hosting collaborator and for tests.
///
/// The wire-level acknowledgement of a push is empty
/// ([`opsync_protocol::PushResponse`]); clients learn the authoritative state
/// through the pull path, never from per-mutation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// The space version before the batch.
    pub prior_version: Version,
    /// The space version after commit. Equals `prior_version` when the batch
    /// produced no effective writes.
    pub version: Version,
    /// The client's last applied mutation id after commit.
    pub last_mutation_id: u64,
    /// Mutations that advanced the sequence in this batch (including
    /// unknown-mutator and failed-mutator no-ops).
    pub applied: usize,
    /// Mutations skipped as already applied (duplicate redelivery).
    pub skipped: usize,
    /// The id of the first from-the-future mutation, if the batch stopped on
    /// a sequence gap. Not an error: the client resubmits once the missing
    /// predecessor exists.
    pub halted_at: Option<u64>,
}

/// The reconciliation engine.
///
/// Replays client-pushed mutations against the authoritative store, one
/// batch per transaction. The store's transaction isolation is the only
/// concurrency primitive involved: the engine keeps no mutable state of its
/// own, so one `Reconciler` can be shared freely across request handlers.
pub struct Reconciler<S: Store> {
    store: Arc<S>,
    registry: Arc<MutatorRegistry>,
    config: EngineConfig,
}

impl<S: Store> Reconciler<S> {
    /// Creates a new engine.
    pub fn new(store: Arc<S>, registry: Arc<MutatorRegistry>, config: EngineConfig) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The mutator registry.
    pub fn registry(&self) -> &MutatorRegistry {
        &self.registry
    }

    /// Processes one push batch inside one transaction.
    ///
    /// For each mutation, in submission order, with `expected` being the
    /// client's last applied id plus one:
    ///
    /// - `id < expected`: already applied in an earlier (possibly retried)
    ///   batch; skipped
    /// - `id > expected`: a predecessor is missing; the rest of the batch is
    ///   left unapplied and the transaction still commits
    /// - `id == expected`: the named mutator runs against a write view fixed
    ///   to the next version; an unknown name or a failing mutator is logged
    ///   and skipped, and the sequence advances either way
    ///
    /// The client's sequence number is persisted if it advanced; the space
    /// version is incremented only if something was written.
    ///
    /// # Errors
    ///
    /// Fails without opening a transaction on a malformed request or a batch
    /// over [`EngineConfig::max_push_batch`]; fails with the transaction
    /// aborted on [`StoreError`], including pushes to a space that does not
    /// exist.
    pub fn handle_push(&self, space: &SpaceId, request: &PushRequest) -> EngineResult<PushOutcome> {
        request.validate()?;
        if request.mutations.len() > self.config.max_push_batch as usize {
            return Err(crate::EngineError::InvalidRequest(format!(
                "too many mutations: {} > {}",
                request.mutations.len(),
                self.config.max_push_batch
            )));
        }

        debug!(
            "processing push from {} with {} mutations",
            request.client_id,
            request.mutations.len()
        );

        let client = ClientId::new(request.client_id.as_str());
        let outcome = self.store.transact(|tx| {
            let prior = tx
                .version(space)?
                .ok_or_else(|| StoreError::unknown_space(space.as_str()))?;
            let next = prior.next();

            let prior_last = tx.last_mutation_id(&client)?.unwrap_or(0);
            debug!("prior version {prior}, last mutation id {prior_last}");

            let mut last_applied = prior_last;
            let mut applied = 0usize;
            let mut skipped = 0usize;
            let mut halted_at = None;

            let dirty = {
                let mut view = VersionedWrite::new(tx, space, next);

                for mutation in &request.mutations {
                    let expected = last_applied + 1;
                    match mutation.id.cmp(&expected) {
                        Ordering::Less => {
                            debug!(
                                "mutation {} has already been processed - skipping",
                                mutation.id
                            );
                            skipped += 1;
                            continue;
                        }
                        Ordering::Greater => {
                            warn!(
                                "mutation {} is from the future (expected {expected}) - \
                                 stopping batch",
                                mutation.id
                            );
                            halted_at = Some(mutation.id);
                            break;
                        }
                        Ordering::Equal => {}
                    }

                    match self.registry.get(&mutation.name) {
                        None => {
                            error!("unknown mutator: {} - skipping", mutation.name);
                        }
                        Some(mutator) => {
                            if let Err(e) = mutator(&mut view, &mutation.args) {
                                match e {
                                    // A storage failure is fatal to the whole
                                    // batch, wherever it surfaces.
                                    MutatorError::Store(store_err) => return Err(store_err),
                                    other => {
                                        error!(
                                            "error executing mutator {}: {other}",
                                            mutation.name
                                        );
                                    }
                                }
                            }
                        }
                    }

                    last_applied = expected;
                    applied += 1;
                }

                view.is_dirty()
            };

            if last_applied > prior_last {
                tx.set_last_mutation_id(&client, last_applied)?;
            }
            let version = if dirty {
                tx.set_version(space, next)?;
                next
            } else {
                prior
            };

            Ok(PushOutcome {
                prior_version: prior,
                version,
                last_mutation_id: last_applied,
                applied,
                skipped,
                halted_at,
            })
        })?;

        debug!(
            "processed push from {}: {} applied, {} skipped, {}",
            request.client_id, outcome.applied, outcome.skipped, outcome.version
        );

        Ok(outcome)
    }
}

impl<S: Store> std::fmt::Debug for Reconciler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
