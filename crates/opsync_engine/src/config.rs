//! Engine configuration.

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of mutations accepted in one push batch.
    ///
    /// Larger batches are rejected before a transaction opens.
    pub max_push_batch: u32,
}

impl EngineConfig {
    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_push_batch: 100,
        }
    }

    /// Sets the maximum push batch size.
    #[must_use]
    pub fn with_max_push_batch(mut self, size: u32) -> Self {
        self.max_push_batch = size;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
