//! # opsync Testkit
//!
//! Test utilities for opsync.
//!
//! This crate provides:
//! - Ready-made mutator registries and engine fixtures
//! - Property-based test generators using proptest, including delivery
//!   plans that model the retries, duplicates and gaps of an unreliable
//!   network
//!
//! ## Usage
//!
//! ```rust
//! use opsync_testkit::prelude::*;
//! use opsync_protocol::PushRequest;
//!
//! let (engine, space) = engine_with(counter_registry());
//! let outcome = engine
//!     .handle_push(&space, &PushRequest::new("c1", append_mutations(1..=3)))
//!     .unwrap();
//! assert_eq!(outcome.last_mutation_id, 3);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
