//! Caseguard LLM
//!
//! Provider abstraction for structured LLM completions. The engine only
//! depends on the contract defined here: a prompt plus a JSON schema in, a
//! schema-conforming JSON value (or a typed error) out. Provider identity
//! and transport are deliberately out of scope — deployments plug in their
//! own implementation of [`LlmProvider`].

pub mod provider;
pub mod retry;
pub mod types;

// Re-export main types
pub use provider::{parse_structured, LlmProvider};
pub use retry::retry_with_backoff;
pub use types::{schema_for, LlmError, LlmResult, RequestOptions, StructuredRequest};
