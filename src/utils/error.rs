//! Error Handling
//!
//! Unified error types for the engine.
//! Uses thiserror for ergonomic error definitions.
//!
//! The taxonomy distinguishes recoverable conditions (validation failures,
//! unavailable retrieval, timeouts — all degraded in place by the
//! pipeline) from caller errors (invalid transition, conflict, not found)
//! and from `Corrupted`, which signals persistent-state damage and always
//! aborts the operation.

use caseguard_core::types::ReportStatus;
use thiserror::Error;

/// Engine-wide error type
#[derive(Error, Debug)]
pub enum EngineError {
    /// Core errors (configuration, parsing)
    #[error(transparent)]
    Core(#[from] caseguard_core::CoreError),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(#[from] caseguard_llm::LlmError),

    /// Agent output failed schema validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Knowledge store unreachable; callers degrade to empty context
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Attempted a status transition not present in the lifecycle table
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: ReportStatus, to: ReportStatus },

    /// A concurrent transition on the same report won the race
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An agent or retrieval call exceeded its budget
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The parent workflow was cancelled; results are discarded
    #[error("Operation cancelled")]
    Cancelled,

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistent state is structurally damaged; fatal
    #[error("Corrupted state: {0}")]
    Corrupted(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for engine errors
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a retrieval-unavailable error
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::RetrievalUnavailable(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a corrupted-state error
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the pipeline may absorb this error by substituting a safe
    /// default: schema failures, timeouts, unavailable retrieval, and
    /// transient provider failures. Deployment defects (bad credentials,
    /// invalid requests) and cancellation are not degradable.
    pub fn is_degradable(&self) -> bool {
        match self {
            EngineError::Validation(_)
            | EngineError::Timeout(_)
            | EngineError::RetrievalUnavailable(_) => true,
            EngineError::Llm(e) => {
                e.is_retryable()
                    || matches!(
                        e,
                        caseguard_llm::LlmError::SchemaMismatch { .. }
                            | caseguard_llm::LlmError::ParseError { .. }
                    )
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = EngineError::InvalidTransition {
            from: ReportStatus::Investigating,
            to: ReportStatus::New,
        };
        assert_eq!(err.to_string(), "Invalid transition: INVESTIGATING -> NEW");
    }

    #[test]
    fn test_degradable_classification() {
        assert!(EngineError::validation("bad score").is_degradable());
        assert!(EngineError::timeout("severity agent").is_degradable());
        assert!(EngineError::retrieval("store down").is_degradable());
        assert!(!EngineError::conflict("transition race").is_degradable());
        assert!(!EngineError::Cancelled.is_degradable());
        assert!(!EngineError::corrupted("unknown status").is_degradable());
    }

    #[test]
    fn test_llm_schema_mismatch_is_degradable() {
        let err: EngineError = caseguard_llm::LlmError::SchemaMismatch {
            message: "missing field".to_string(),
        }
        .into();
        assert!(err.is_degradable());

        let err: EngineError = caseguard_llm::LlmError::AuthenticationFailed {
            message: "bad key".to_string(),
        }
        .into();
        assert!(!err.is_degradable());
    }
}
