//! LLM Provider Trait
//!
//! Defines the common interface all LLM providers must implement: a
//! structured completion against a JSON schema, plus a health check.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::types::{LlmError, LlmResult, StructuredRequest};

/// Trait that all LLM providers must implement.
///
/// A provider receives a [`StructuredRequest`] and must answer with a JSON
/// value conforming to the request's schema. Providers that support a
/// native JSON/structured-output mode should enable it; others may rely on
/// prompt instructions and return [`LlmError::SchemaMismatch`] when the
/// model ignores them. Callers re-validate the value regardless.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Run a structured completion and return the raw JSON value.
    async fn complete(&self, request: StructuredRequest) -> LlmResult<serde_json::Value>;

    /// Check if the provider is healthy and reachable.
    async fn health_check(&self) -> LlmResult<()>;
}

/// Deserialize a provider response into a typed output.
///
/// A shape mismatch is reported as [`LlmError::SchemaMismatch`] so callers
/// can route it through their retry-with-correction path.
pub fn parse_structured<T: DeserializeOwned>(value: serde_json::Value) -> LlmResult<T> {
    serde_json::from_value(value).map_err(|e| LlmError::SchemaMismatch {
        message: e.to_string(),
    })
}
