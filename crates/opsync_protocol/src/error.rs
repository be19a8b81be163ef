//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while decoding or validating protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The request body could not be decoded as JSON of the expected shape.
    #[error("malformed request: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request decoded but violates a protocol constraint.
    #[error("invalid request: {message}")]
    Invalid {
        /// Description of the violated constraint.
        message: String,
    },
}

impl ProtocolError {
    /// Creates an invalid-request error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_carries_message() {
        let err = ProtocolError::invalid("mutation id must be >= 1");
        assert!(err.to_string().contains("mutation id must be >= 1"));
    }

    #[test]
    fn decode_wraps_serde_error() {
        let err: ProtocolError = serde_json::from_str::<u64>("[]").unwrap_err().into();
        assert!(matches!(err, ProtocolError::Decode(_)));
        assert!(err.to_string().starts_with("malformed request"));
    }
}
