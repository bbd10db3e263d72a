//! SLA Deadline Derivation
//!
//! Deadlines are a pure function of (severity, assessment instant) via
//! the configured SLA matrix. They carry no storage authority: whenever
//! the severity is set or changed, the triple is recomputed and
//! overwrites whatever was there before.

use chrono::{DateTime, Utc};

use caseguard_core::config::SlaMatrix;
use caseguard_core::types::SeverityLevel;

use crate::models::SlaDeadlines;

/// Derive the deadline triple for a severity assessed at `assessed_at`.
///
/// Returns `None` for `Unknown`: a degraded assessment sets no clock,
/// the case routes to human review instead.
pub fn deadlines_for(
    severity: SeverityLevel,
    assessed_at: DateTime<Utc>,
    matrix: &SlaMatrix,
) -> Option<SlaDeadlines> {
    matrix
        .window(severity)
        .map(|window| SlaDeadlines::from_window(window, assessed_at))
}
