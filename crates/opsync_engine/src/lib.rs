//! # opsync Engine
//!
//! Server-side mutation-replay engine for opsync.
//!
//! This crate provides:
//! - [`Reconciler`], the request handler that replays client-submitted
//!   mutations against the authoritative store
//! - [`MutatorRegistry`], the name-to-handler table mutations dispatch through
//! - Space management (create / exists / version)
//! - The incremental pull reader answering "everything since cookie V"
//!
//! # Reconciliation
//!
//! Clients apply mutations locally first and push them later; the server
//! re-runs each mutation here, and the server's outcome wins. One push batch
//! is processed inside one store transaction: the engine reads the space
//! version and the client's last applied mutation id, replays the batch in
//! order - skipping already-applied mutations, stopping on a sequence gap -
//! and commits the advanced sequence number and (if anything was written) the
//! incremented space version atomically.
//!
//! ```
//! use opsync_engine::{EngineConfig, MutatorRegistry, Reconciler};
//! use opsync_protocol::{Mutation, PushRequest};
//! use opsync_store::{MemoryStore, SpaceId};
//! use std::sync::Arc;
//!
//! let mut registry = MutatorRegistry::new();
//! registry.register("createTodo", |view, args| {
//!     let id = args["id"].as_str().unwrap_or_default();
//!     view.put(&format!("todo/{id}"), args)?;
//!     Ok(())
//! });
//!
//! let engine = Reconciler::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(registry),
//!     EngineConfig::default(),
//! );
//!
//! let space = SpaceId::new("demo");
//! engine.create_space(&space).unwrap();
//!
//! let push = PushRequest::new(
//!     "c1",
//!     vec![Mutation::new(1, "createTodo", serde_json::json!({ "id": "t1" }))],
//! );
//! let outcome = engine.handle_push(&space, &push).unwrap();
//! assert_eq!(outcome.version.as_u64(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod pull;
mod push;
mod registry;
mod space;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use push::{PushOutcome, Reconciler};
pub use registry::{MutatorError, MutatorFn, MutatorRegistry, MutatorResult};
