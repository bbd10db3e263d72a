//! Analysis Agents
//!
//! The sequential multi-agent pipeline. Each agent wraps one structured
//! LLM call: a fixed prompt template, the accumulated analysis context,
//! and a strict typed output schema. Agents never call each other — only
//! the [`orchestrator::Orchestrator`] sequences them, which keeps the
//! pipeline order auditable and retries trivial.

pub mod analysis;
pub mod compliance;
pub mod context;
pub mod intake;
pub mod orchestrator;
pub mod quick;
pub mod recommendation;
pub mod severity;
pub mod summary;

pub use analysis::AnalysisAgent;
pub use compliance::ComplianceAgent;
pub use context::AnalysisContext;
pub use intake::IntakeAgent;
pub use orchestrator::Orchestrator;
pub use quick::QuickAnalyzer;
pub use recommendation::RecommendationAgent;
pub use severity::SeverityAgent;
pub use summary::SummaryAgent;
