//! Engine error types

use onsem_sdk::BridgeError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures reported by a semantic engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A linguistic resource could not be found or loaded
    #[error("missing linguistic resource: {0}")]
    MissingResource(String),

    /// The engine cannot handle the input
    #[error("{0} is not supported")]
    Unsupported(String),

    /// An executor callback into the host failed
    #[error("executor callback failed: {0}")]
    Callback(String),

    /// Any other engine failure
    #[error("{0}")]
    Operation(String),
}

impl From<EngineError> for BridgeError {
    fn from(e: EngineError) -> Self {
        BridgeError::Engine(e.to_string())
    }
}

impl From<BridgeError> for EngineError {
    fn from(e: BridgeError) -> Self {
        EngineError::Callback(e.to_string())
    }
}
