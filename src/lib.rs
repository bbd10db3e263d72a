//! Caseguard
//!
//! Library core of an AI-assisted whistleblowing case system. Three
//! subsystems around a shared domain model:
//!
//! - **Analysis** (`services::agents`) — a strictly sequential
//!   multi-agent pipeline (intake → fraud → compliance → severity →
//!   recommendation → summary) over a structured-completion LLM
//!   contract, plus a single-call quick analyzer. Agent outputs are
//!   strict typed schemas validated at the orchestrator boundary;
//!   failures degrade to safe defaults and mark the result PARTIAL.
//! - **Knowledge** (`services::knowledge`) — chunking, deterministic
//!   embeddings, a top-k cosine vector store seam, and a fail-closed
//!   retriever grounding the agents in regulations and past cases.
//! - **Workflow** (`services::workflow`) — the case lifecycle state
//!   machine with per-report transition serialization, pure SLA deadline
//!   derivation, and the escalation rule engine.
//!
//! HTTP routing, authentication, channel adapters, persistent storage
//! engines, and notification delivery are external collaborators behind
//! the seams in `services::repository` and `caseguard-llm`.

pub mod models;
pub mod services;
pub mod utils;

// ── Errors ─────────────────────────────────────────────────────────────
pub use utils::error::{EngineError, EngineResult};

// ── Domain models ──────────────────────────────────────────────────────
pub use models::{
    AnalysisCompletion, AnalysisMode, AnalysisResult, CaseHistoryEntry, EscalationRecord, Report,
    ReportDraft, SlaDeadlines,
};

// ── Services ───────────────────────────────────────────────────────────
pub use services::agents::{Orchestrator, QuickAnalyzer};
pub use services::knowledge::{
    CachedEmbedder, EmbeddingProvider, HashingEmbedder, InMemoryKnowledgeStore, KnowledgeIndexer,
    KnowledgeStore, RagRetriever,
};
pub use services::repository::{
    InMemoryRepository, LogDispatch, NotificationDispatch, Repository,
};
pub use services::workflow::{CaseStateMachine, CaseWorkflow, EscalationEngine};
