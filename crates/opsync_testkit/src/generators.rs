//! Property-based test generators using proptest.
//!
//! The central generator is [`delivery_plan_strategy`]: it models what an
//! unreliable network does to a client's gapless mutation stream - batch
//! boundaries in arbitrary places, whole batches redelivered immediately, and
//! stale batches redelivered long after they were first applied. Replaying
//! any such plan must leave the server in the same state as one clean
//! delivery.

use proptest::prelude::*;

/// Strategy for generating client IDs.
pub fn client_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("c[a-z0-9]{1,8}").expect("valid regex")
}

/// An ordered delivery of one client's mutations `1..=n`, chopped into
/// batches with duplicates mixed in.
#[derive(Debug, Clone)]
pub struct DeliveryPlan {
    /// The highest mutation id; ids `1..=n` all appear at least once.
    pub n: u64,
    /// Batches in delivery order, each a list of mutation ids.
    pub batches: Vec<Vec<u64>>,
}

/// Strategy for delivery plans covering `1..=max_mutations` mutations.
///
/// Every plan delivers each id at least once, first occurrences in order, so
/// a correct engine ends with `last_mutation_id == n` and every mutation
/// applied exactly once.
pub fn delivery_plan_strategy(max_mutations: u64) -> impl Strategy<Value = DeliveryPlan> {
    (1..=max_mutations)
        .prop_flat_map(|n| {
            (
                Just(n),
                // Cut points between consecutive mutations.
                prop::collection::vec(any::<bool>(), (n - 1) as usize),
                // Immediate redelivery of each batch.
                prop::collection::vec(any::<bool>(), n as usize),
                // A stale batch redelivered at the very end.
                prop::option::of(any::<prop::sample::Index>()),
            )
        })
        .prop_map(|(n, cuts, redeliver, stale)| {
            let mut batches: Vec<Vec<u64>> = Vec::new();
            let mut current = vec![1u64];
            for (index, cut) in cuts.iter().enumerate() {
                if *cut {
                    batches.push(std::mem::take(&mut current));
                }
                current.push(index as u64 + 2);
            }
            batches.push(current);

            let mut plan = Vec::new();
            for (index, batch) in batches.iter().enumerate() {
                plan.push(batch.clone());
                if redeliver.get(index).copied().unwrap_or(false) {
                    plan.push(batch.clone());
                }
            }
            if let Some(index) = stale {
                plan.push(batches[index.index(batches.len())].clone());
            }

            DeliveryPlan { n, batches: plan }
        })
}

/// Strategy for a stream `1..=n` with exactly one id missing.
///
/// Returns `(n, missing)`; delivering the stream without `missing` must halt
/// the batch at the gap, and a follow-up clean delivery must recover.
pub fn gapped_stream_strategy(max_mutations: u64) -> impl Strategy<Value = (u64, u64)> {
    (2..=max_mutations).prop_flat_map(|n| (Just(n), 1..=n))
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 64,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
