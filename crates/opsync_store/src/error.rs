//! Error types for the store seam.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed space does not exist.
    #[error("unknown space: {space}")]
    UnknownSpace {
        /// The space that was addressed.
        space: String,
    },

    /// A stored value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The transaction lost a serialization conflict and was aborted.
    ///
    /// Nothing was persisted; retrying the whole batch is the caller's
    /// decision. [`crate::MemoryStore`] never emits this (its transactions
    /// are mutually exclusive), but backends with optimistic isolation do.
    #[error("transaction conflict: {message}")]
    Conflict {
        /// Description of the conflict.
        message: String,
    },

    /// The storage backend failed.
    #[error("backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates an unknown-space error.
    pub fn unknown_space(space: impl Into<String>) -> Self {
        Self::UnknownSpace {
            space: space.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns true if retrying the transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_space_display() {
        let err = StoreError::unknown_space("s1");
        assert_eq!(err.to_string(), "unknown space: s1");
    }

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(StoreError::conflict("write-write").is_retryable());
        assert!(!StoreError::backend("disk full").is_retryable());
        assert!(!StoreError::unknown_space("s1").is_retryable());
    }
}
