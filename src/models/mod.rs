//! Domain Models
//!
//! The report aggregate and its append-only satellites (case history,
//! escalation records), plus the SLA deadline triple. The report is owned
//! by the workflow: it is mutated only through state-machine transitions
//! or analysis ingestion, never deleted, only terminally closed.

pub mod analysis;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caseguard_core::config::SlaWindow;
use caseguard_core::types::{
    EscalationLevel, Priority, ReportChannel, ReportStatus, SeverityLevel, ViolationCategory,
};

pub use analysis::{AnalysisCompletion, AnalysisMode, AnalysisResult};

/// Alphabet for public ticket identifiers. Excludes 0/O and 1/I to keep
/// the codes unambiguous when read back over the phone.
const TICKET_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a public ticket identifier.
pub const TICKET_ID_LEN: usize = 8;

/// Generate a public tracking ticket id (8 uppercase alphanumerics).
///
/// The ticket id is the reporter-facing handle and is distinct from the
/// internal report id.
pub fn generate_ticket_id() -> String {
    let mut rng = rand::thread_rng();
    (0..TICKET_ID_LEN)
        .map(|_| TICKET_ALPHABET[rng.gen_range(0..TICKET_ALPHABET.len())] as char)
        .collect()
}

/// SLA deadline triple, derived from (severity, assessment instant).
///
/// Pure value: it has no storage authority of its own and is recomputed
/// whenever the severity is set or changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaDeadlines {
    /// Deadline for the first response to the reporter.
    pub response_due: DateTime<Utc>,
    /// Deadline for finishing the initial review.
    pub review_due: DateTime<Utc>,
    /// Deadline for finishing the investigation.
    pub investigation_due: DateTime<Utc>,
}

impl SlaDeadlines {
    /// Derive the deadline triple from an SLA window and a base instant.
    pub fn from_window(window: &SlaWindow, from: DateTime<Utc>) -> Self {
        Self {
            response_due: from + Duration::hours(window.initial_response_hours),
            review_due: from + Duration::days(window.review_deadline_days),
            investigation_due: from + Duration::days(window.investigation_deadline_days),
        }
    }

    /// Whether any of the three deadlines has passed at `now`.
    pub fn any_breached(&self, now: DateTime<Utc>) -> bool {
        now > self.response_due || now > self.review_due || now > self.investigation_due
    }
}

/// Parameters for creating a new report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDraft {
    pub channel: ReportChannel,
    pub subject: String,
    pub description: String,
    pub is_anonymous: bool,
    /// Contact info (email/phone); absent for anonymous reports.
    pub reporter_contact: Option<String>,
    pub incident_date: Option<String>,
    pub incident_location: Option<String>,
    pub parties_involved: Vec<String>,
}

/// A whistleblower report.
///
/// Identity (`id`, `ticket_id`) is immutable; classification fields are
/// written by analysis ingestion and status by the lifecycle state
/// machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Internal identity.
    pub id: Uuid,
    /// Public tracking identifier handed to the reporter.
    pub ticket_id: String,
    pub channel: ReportChannel,
    pub subject: String,
    pub description: String,
    pub is_anonymous: bool,
    pub reporter_contact: Option<String>,
    pub incident_date: Option<String>,
    pub incident_location: Option<String>,
    pub parties_involved: Vec<String>,

    pub status: ReportStatus,
    pub severity: SeverityLevel,
    pub category: ViolationCategory,
    pub fraud_score: Option<f64>,
    pub priority: Option<Priority>,
    /// Organisational unit the case is assigned to.
    pub assigned_unit: Option<String>,
    /// Set when a degraded (PARTIAL) analysis requires a human decision
    /// before any automatic escalation is trusted.
    pub needs_human_review: bool,

    pub deadlines: Option<SlaDeadlines>,
    pub analysis: Option<AnalysisResult>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stamped on entering a terminal status; freezes SLA tracking.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Create a new report in the `New` status.
    pub fn new(draft: ReportDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_id: generate_ticket_id(),
            channel: draft.channel,
            subject: draft.subject,
            description: draft.description,
            is_anonymous: draft.is_anonymous,
            reporter_contact: draft.reporter_contact,
            incident_date: draft.incident_date,
            incident_location: draft.incident_location,
            parties_involved: draft.parties_involved,
            status: ReportStatus::New,
            severity: SeverityLevel::Unknown,
            category: ViolationCategory::Unknown,
            fraud_score: None,
            priority: None,
            assigned_unit: None,
            needs_human_review: false,
            deadlines: None,
            analysis: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    /// Whether the report is terminally closed.
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Append-only audit entry for a report.
///
/// Written on every successful status transition and on analysis
/// ingestion. The current status is a projection of this log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseHistoryEntry {
    pub id: Uuid,
    pub report_id: Uuid,
    pub old_status: ReportStatus,
    pub new_status: ReportStatus,
    /// Who performed the transition (role or system identity).
    pub actor: String,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

impl CaseHistoryEntry {
    pub fn new(
        report_id: Uuid,
        old_status: ReportStatus,
        new_status: ReportStatus,
        actor: impl Into<String>,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            report_id,
            old_status,
            new_status,
            actor: actor.into(),
            note,
            at,
        }
    }
}

/// Append-only record of an escalation decision. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub id: Uuid,
    pub report_id: Uuid,
    pub level: EscalationLevel,
    /// Rule that triggered the escalation.
    pub trigger: String,
    /// Role the case routes to.
    pub notify_party: String,
    pub at: DateTime<Utc>,
}
