//! Caseguard Core
//!
//! Foundational error types, closed domain enumerations, and the injected
//! engine configuration for the Caseguard workspace. This crate has zero
//! dependencies on engine-level code (agents, retrieval, workflow).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `types` - Domain enumerations (`ReportStatus`, `SeverityLevel`, ...)
//! - `config` - Injected configuration (`EngineConfig` and its sections)
//!
//! ## Design Principles
//!
//! 1. **Closed enumerations** - category/severity/status are strict enums
//!    with explicit `Unknown` variants where the pipeline may degrade
//! 2. **No ambient state** - every constant the workflow or escalation
//!    logic consumes lives in `EngineConfig` and is passed in explicitly
//! 3. **Unidirectional dependency** - this crate depends on nothing else
//!    in the workspace

pub mod config;
pub mod error;
pub mod types;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Domain Enumerations ────────────────────────────────────────────────
pub use types::{
    ActorSeniority, EscalationLevel, Priority, ReportChannel, ReportStatus, SeverityLevel,
    ViolationCategory,
};

// ── Configuration ──────────────────────────────────────────────────────
pub use config::{
    AgentBudget, CategoryInfo, EngineConfig, EscalationPolicy, RetrievalConfig, SlaMatrix,
    SlaWindow,
};
