//! LLM Request and Error Types
//!
//! Shared types for the structured-completion contract: the request shape
//! handed to providers and the error taxonomy they report back.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tuning options for a single completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Sampling temperature; providers fall back to their default when
    /// unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A structured completion request.
///
/// The provider must return a JSON value conforming to `schema`; callers
/// still validate the result on their side and treat a mismatch as a
/// recoverable validation failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredRequest {
    /// System instruction describing the task and the output contract.
    pub system: String,
    /// User content (the material to analyze).
    pub user: String,
    /// JSON schema the response must conform to.
    pub schema: serde_json::Value,
    /// Request tuning options.
    #[serde(default)]
    pub options: RequestOptions,
}

impl StructuredRequest {
    /// Create a request with default options.
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            schema,
            options: RequestOptions::default(),
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    /// Set the output token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    /// Append a corrective instruction to the system prompt, used when a
    /// previous response failed schema validation.
    pub fn with_correction(mut self, correction: &str) -> Self {
        self.system.push_str("\n\nCORRECTION: ");
        self.system.push_str(correction);
        self
    }
}

/// Generate the JSON schema for a response type.
pub fn schema_for<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default()
}

/// Error types for LLM operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LlmError {
    /// Authentication failed (invalid API key)
    AuthenticationFailed { message: String },
    /// Rate limit exceeded
    RateLimited {
        message: String,
        retry_after: Option<u32>,
    },
    /// Model not found or not available
    ModelNotFound { model: String },
    /// Invalid request (bad parameters)
    InvalidRequest { message: String },
    /// Server error from the provider
    ServerError {
        message: String,
        status: Option<u16>,
    },
    /// Network/connection error
    NetworkError { message: String },
    /// Response could not be parsed as JSON
    ParseError { message: String },
    /// Response parsed but did not conform to the requested schema
    SchemaMismatch { message: String },
    /// Provider not available (not configured, not running)
    ProviderUnavailable { message: String },
    /// Context length exceeded
    ContextLengthExceeded {
        message: String,
        max_tokens: Option<u32>,
    },
    /// Other error
    Other { message: String },
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::AuthenticationFailed { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            LlmError::RateLimited { message, .. } => {
                write!(f, "Rate limited: {}", message)
            }
            LlmError::ModelNotFound { model } => {
                write!(f, "Model not found: {}", model)
            }
            LlmError::InvalidRequest { message } => {
                write!(f, "Invalid request: {}", message)
            }
            LlmError::ServerError { message, status } => {
                if let Some(s) = status {
                    write!(f, "Server error ({}): {}", s, message)
                } else {
                    write!(f, "Server error: {}", message)
                }
            }
            LlmError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            LlmError::ParseError { message } => {
                write!(f, "Parse error: {}", message)
            }
            LlmError::SchemaMismatch { message } => {
                write!(f, "Schema mismatch: {}", message)
            }
            LlmError::ProviderUnavailable { message } => {
                write!(f, "Provider unavailable: {}", message)
            }
            LlmError::ContextLengthExceeded { message, .. } => {
                write!(f, "Context length exceeded: {}", message)
            }
            LlmError::Other { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    /// Whether this error is transient and the call should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. }
                | LlmError::ServerError { .. }
                | LlmError::NetworkError { .. }
                | LlmError::ProviderUnavailable { .. }
        )
    }

    /// For rate-limited errors, the suggested wait time in seconds.
    pub fn retry_after_secs(&self) -> Option<u64> {
        if let LlmError::RateLimited { retry_after, .. } = self {
            retry_after.map(|s| s as u64)
        } else {
            None
        }
    }
}

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Probe {
        score: f64,
        label: String,
    }

    #[test]
    fn test_schema_for_produces_object_schema() {
        let schema = schema_for::<Probe>();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["score"].is_object());
        assert!(schema["properties"]["label"].is_object());
    }

    #[test]
    fn test_request_with_correction_appends() {
        let req = StructuredRequest::new("system", "user", serde_json::json!({}))
            .with_correction("return fraud_score in [0,1]");
        assert!(req.system.starts_with("system"));
        assert!(req.system.contains("CORRECTION: return fraud_score"));
    }

    #[test]
    fn test_request_builder_options() {
        let req = StructuredRequest::new("s", "u", serde_json::json!({}))
            .with_temperature(0.1)
            .with_max_tokens(2048);
        assert_eq!(req.options.temperature, Some(0.1));
        assert_eq!(req.options.max_tokens, Some(2048));
    }

    #[test]
    fn test_error_display() {
        let err = LlmError::ServerError {
            message: "internal".to_string(),
            status: Some(500),
        };
        assert_eq!(err.to_string(), "Server error (500): internal");

        let err = LlmError::SchemaMismatch {
            message: "missing field `level`".to_string(),
        };
        assert!(err.to_string().contains("Schema mismatch"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::NetworkError {
            message: "timeout".into()
        }
        .is_retryable());
        assert!(LlmError::RateLimited {
            message: "slow down".into(),
            retry_after: Some(5)
        }
        .is_retryable());
        assert!(!LlmError::SchemaMismatch {
            message: "bad shape".into()
        }
        .is_retryable());
        assert!(!LlmError::AuthenticationFailed {
            message: "bad key".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_retry_after_secs() {
        let err = LlmError::RateLimited {
            message: "slow down".into(),
            retry_after: Some(7),
        };
        assert_eq!(err.retry_after_secs(), Some(7));
        assert_eq!(
            LlmError::Other {
                message: "x".into()
            }
            .retry_after_secs(),
            None
        );
    }
}
