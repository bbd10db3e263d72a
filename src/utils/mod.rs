//! Shared Utilities
//!
//! Cross-cutting helpers for the engine crate.

pub mod error;

pub use error::{EngineError, EngineResult};
