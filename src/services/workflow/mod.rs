//! Case Lifecycle Workflow
//!
//! Converts analysis output into lifecycle state, SLA deadlines, and
//! escalation decisions:
//!
//! - `sla` - pure deadline derivation from (severity, instant)
//! - `lifecycle` - the status state machine with per-report transition
//!   serialization
//! - `escalation` - pure rule evaluation against configured thresholds
//! - `service` - the coordinator wiring state machine, escalation, the
//!   repository, and notification dispatch together

pub mod escalation;
pub mod lifecycle;
pub mod service;
pub mod sla;

pub use escalation::{EscalationDecision, EscalationEngine};
pub use lifecycle::CaseStateMachine;
pub use service::{CaseWorkflow, IngestOutcome};
pub use sla::deadlines_for;
