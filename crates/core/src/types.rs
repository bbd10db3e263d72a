//! Domain Enumerations
//!
//! Closed enumerations for report lifecycle status, severity, violation
//! category, and escalation routing. The analysis pipeline may degrade an
//! agent call to a safe default, so `SeverityLevel` and `ViolationCategory`
//! carry explicit `Unknown` variants; everything else is strict.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a whistleblower report.
///
/// `New` is the only initial state. The three `Closed*` states are
/// terminal: once entered, no further transition is permitted. The legal
/// edges between states are enumerated by the workflow's lifecycle table,
/// not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    /// Report received, not yet reviewed.
    New,
    /// Case handler is reviewing the report.
    Reviewing,
    /// Waiting for additional information from the reporter.
    NeedInfo,
    /// Investigation in progress.
    Investigating,
    /// Handling temporarily suspended.
    Hold,
    /// Escalated to a higher authority.
    Escalated,
    /// Investigation finished, violation proven.
    ClosedProven,
    /// Investigation finished, insufficient evidence.
    ClosedNotProven,
    /// Closed without investigation: out of scope or invalid.
    ClosedInvalid,
}

impl ReportStatus {
    /// Whether this status is terminal (no transitions out).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReportStatus::ClosedProven
                | ReportStatus::ClosedNotProven
                | ReportStatus::ClosedInvalid
        )
    }

    /// Stable string code used in history entries and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::New => "NEW",
            ReportStatus::Reviewing => "REVIEWING",
            ReportStatus::NeedInfo => "NEED_INFO",
            ReportStatus::Investigating => "INVESTIGATING",
            ReportStatus::Hold => "HOLD",
            ReportStatus::Escalated => "ESCALATED",
            ReportStatus::ClosedProven => "CLOSED_PROVEN",
            ReportStatus::ClosedNotProven => "CLOSED_NOT_PROVEN",
            ReportStatus::ClosedInvalid => "CLOSED_INVALID",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a reported violation.
///
/// Ordered: `Unknown < Low < Medium < High < Critical`. `Unknown` is the
/// safe default substituted when the severity agent degrades; it maps to
/// no SLA window.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLevel {
    /// Not assessed (degraded pipeline or pre-analysis).
    Unknown,
    /// Minor violation, limited impact.
    Low,
    /// Moderate violation, potential financial loss.
    Medium,
    /// Serious violation, significant impact.
    High,
    /// Very serious: senior officials involved or major loss.
    Critical,
}

impl SeverityLevel {
    /// All assessed levels, lowest first.
    pub const ASSESSED: [SeverityLevel; 4] = [
        SeverityLevel::Low,
        SeverityLevel::Medium,
        SeverityLevel::High,
        SeverityLevel::Critical,
    ];

    /// Whether a real assessment was made.
    pub fn is_assessed(&self) -> bool {
        !matches!(self, SeverityLevel::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Unknown => "UNKNOWN",
            SeverityLevel::Low => "LOW",
            SeverityLevel::Medium => "MEDIUM",
            SeverityLevel::High => "HIGH",
            SeverityLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of the reported violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCategory {
    /// Not classified (degraded pipeline or pre-analysis).
    Unknown,
    /// Fraudulent or deceptive conduct.
    Fraud,
    /// Abuse of authority for personal gain.
    Corruption,
    /// Gifts or facilitation payments tied to an office.
    Gratification,
    /// Conflict of interest in decision-making.
    #[serde(rename = "COI")]
    ConflictOfInterest,
    /// Procurement or tender irregularities.
    Procurement,
    /// Unauthorized disclosure of personal or confidential data.
    DataBreach,
    /// Breach of the code of ethics.
    Ethics,
    /// Disciplinary misconduct.
    Misconduct,
    /// In scope but outside the enumerated categories.
    Other,
}

impl ViolationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCategory::Unknown => "UNKNOWN",
            ViolationCategory::Fraud => "FRAUD",
            ViolationCategory::Corruption => "CORRUPTION",
            ViolationCategory::Gratification => "GRATIFICATION",
            ViolationCategory::ConflictOfInterest => "COI",
            ViolationCategory::Procurement => "PROCUREMENT",
            ViolationCategory::DataBreach => "DATA_BREACH",
            ViolationCategory::Ethics => "ETHICS",
            ViolationCategory::Misconduct => "MISCONDUCT",
            ViolationCategory::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Intake channel a report arrived through.
///
/// Channel adapters live outside the engine; the provenance is kept on the
/// report and echoed in notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportChannel {
    Web,
    Whatsapp,
    Email,
}

impl std::fmt::Display for ReportChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportChannel::Web => write!(f, "WEB"),
            ReportChannel::Whatsapp => write!(f, "WHATSAPP"),
            ReportChannel::Email => write!(f, "EMAIL"),
        }
    }
}

/// Handling priority, derived from severity and fraud score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Priority {
    /// Low priority.
    P4,
    /// Normal priority.
    P3,
    /// Urgent attention needed.
    P2,
    /// Immediate action required.
    P1,
}

impl Priority {
    /// Derive the handling priority from severity and fraud score.
    ///
    /// A very high fraud score upgrades an otherwise low/medium case to
    /// P2 so it is not parked behind routine work.
    pub fn derive(severity: SeverityLevel, fraud_score: f64) -> Self {
        if fraud_score >= 0.8 && severity <= SeverityLevel::Medium {
            return Priority::P2;
        }
        match severity {
            SeverityLevel::Critical => Priority::P1,
            SeverityLevel::High => Priority::P2,
            SeverityLevel::Medium => Priority::P3,
            SeverityLevel::Low | SeverityLevel::Unknown => Priority::P4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
            Priority::P4 => "P4",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Seniority of the most senior actor named in a report.
///
/// Ordered: higher seniority compares greater. Drives escalation routing
/// together with the estimated loss.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorSeniority {
    Staff,
    Manager,
    Director,
    Executive,
}

/// Escalation routing tier.
///
/// Level 1 is standard handling (no escalation record); levels 2-4 route
/// to progressively more senior roles per the configured escalation
/// matrix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum EscalationLevel {
    Level1,
    Level2,
    Level3,
    Level4,
}

impl EscalationLevel {
    /// Numeric tier, 1-4.
    pub fn rank(&self) -> u8 {
        match self {
            EscalationLevel::Level1 => 1,
            EscalationLevel::Level2 => 2,
            EscalationLevel::Level3 => 3,
            EscalationLevel::Level4 => 4,
        }
    }
}

impl std::fmt::Display for EscalationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level {}", self.rank())
    }
}
