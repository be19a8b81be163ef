//! Error types for the engine.

use opsync_protocol::ProtocolError;
use opsync_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while handling a request.
///
/// Per-mutation conditions (unknown mutator, mutator failure, sequence gap)
/// are deliberately not errors: they are logged and folded into the batch
/// outcome so a bad mutation can never wedge a client.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request failed protocol validation; no transaction was opened.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The request shape is valid but violates an engine limit.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The storage layer failed; the transaction aborted with nothing
    /// persisted.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Returns true if this is the caller's fault (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::Protocol(_)
                | EngineError::InvalidRequest(_)
                | EngineError::Store(StoreError::UnknownSpace { .. })
        )
    }

    /// Returns true if this is a server-side failure (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}
