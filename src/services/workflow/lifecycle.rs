//! Case Lifecycle State Machine
//!
//! A fixed adjacency table enumerates the legal target statuses from each
//! source status. Transitions outside the table fail with
//! `InvalidTransition` and leave the report untouched. Every successful
//! transition appends a history entry; entering a terminal status stamps
//! `closed_at` and freezes SLA tracking.
//!
//! Concurrency: transitions on the same report are serialized through a
//! per-report lock registry. The losing side of a race gets `Conflict`
//! immediately instead of silently overwriting the winner.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use caseguard_core::config::EngineConfig;
use caseguard_core::types::ReportStatus;

use super::sla::deadlines_for;
use crate::models::{AnalysisResult, CaseHistoryEntry, Report};
use crate::services::repository::Repository;
use crate::utils::error::{EngineError, EngineResult};

/// Legal target statuses from a source status.
///
/// New is the only initial status and never a transition target; the
/// three `Closed*` statuses are terminal.
pub fn allowed_targets(from: ReportStatus) -> &'static [ReportStatus] {
    use ReportStatus::*;
    match from {
        New => &[Reviewing, NeedInfo, Investigating, Hold],
        Reviewing => &[
            NeedInfo,
            Investigating,
            Escalated,
            Hold,
            ClosedNotProven,
            ClosedInvalid,
        ],
        NeedInfo => &[Reviewing, Investigating, Hold, ClosedNotProven, ClosedInvalid],
        Investigating => &[Escalated, Hold, ClosedProven, ClosedNotProven],
        Escalated => &[Investigating, Hold, ClosedProven, ClosedNotProven],
        Hold => &[Reviewing, NeedInfo, Investigating, ClosedNotProven],
        ClosedProven | ClosedNotProven | ClosedInvalid => &[],
    }
}

/// Whether `from -> to` is a legal edge.
pub fn can_transition(from: ReportStatus, to: ReportStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// All statuses, for exhaustive table checks.
pub const ALL_STATUSES: [ReportStatus; 9] = [
    ReportStatus::New,
    ReportStatus::Reviewing,
    ReportStatus::NeedInfo,
    ReportStatus::Investigating,
    ReportStatus::Hold,
    ReportStatus::Escalated,
    ReportStatus::ClosedProven,
    ReportStatus::ClosedNotProven,
    ReportStatus::ClosedInvalid,
];

/// Structural check of the lifecycle table. A violation indicates a
/// defective build, not a transient condition, and is fatal.
fn verify_lifecycle_table() -> EngineResult<()> {
    for status in ALL_STATUSES {
        if status.is_terminal() && !allowed_targets(status).is_empty() {
            return Err(EngineError::corrupted(format!(
                "terminal status {} has outgoing transitions",
                status
            )));
        }
        if allowed_targets(status).contains(&ReportStatus::New) {
            return Err(EngineError::corrupted(
                "NEW must be reachable only at report creation",
            ));
        }
    }
    Ok(())
}

/// Removes the per-report lock entry when the transition finishes.
struct TransitionLock {
    locks: Arc<DashMap<Uuid, ()>>,
    report_id: Uuid,
}

impl Drop for TransitionLock {
    fn drop(&mut self) {
        self.locks.remove(&self.report_id);
    }
}

/// Serialized lifecycle mutations over the repository.
pub struct CaseStateMachine {
    repo: Arc<dyn Repository>,
    config: Arc<EngineConfig>,
    locks: Arc<DashMap<Uuid, ()>>,
}

impl CaseStateMachine {
    /// Create the state machine, verifying the lifecycle table.
    pub fn new(repo: Arc<dyn Repository>, config: Arc<EngineConfig>) -> EngineResult<Self> {
        verify_lifecycle_table()?;
        config.validate()?;
        Ok(Self {
            repo,
            config,
            locks: Arc::new(DashMap::new()),
        })
    }

    /// Acquire the per-report transition lock, or fail with `Conflict`.
    fn try_lock(&self, report_id: Uuid) -> EngineResult<TransitionLock> {
        use dashmap::mapref::entry::Entry;
        match self.locks.entry(report_id) {
            Entry::Occupied(_) => Err(EngineError::conflict(format!(
                "concurrent transition in progress for report {}",
                report_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(TransitionLock {
                    locks: self.locks.clone(),
                    report_id,
                })
            }
        }
    }

    /// Transition a report to a new status.
    ///
    /// On success the report is saved, a history entry appended, and the
    /// (report, entry) pair returned for the caller to notify on. On any
    /// failure the persisted report is unchanged.
    pub async fn transition(
        &self,
        report_id: Uuid,
        to: ReportStatus,
        actor: &str,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<(Report, CaseHistoryEntry)> {
        let _lock = self.try_lock(report_id)?;

        let mut report = self.repo.load(report_id).await?;
        let from = report.status;
        if !can_transition(from, to) {
            return Err(EngineError::InvalidTransition { from, to });
        }

        report.status = to;
        report.updated_at = now;
        if to.is_terminal() {
            report.closed_at = Some(now);
        }

        let entry = CaseHistoryEntry::new(report_id, from, to, actor, note, now);
        self.repo.append_history(entry.clone()).await?;
        self.repo.save(&report).await?;
        tracing::info!(
            ticket_id = %report.ticket_id,
            from = %from,
            to = %to,
            actor,
            "status transition committed"
        );
        Ok((report, entry))
    }

    /// Apply an analysis result to a report.
    ///
    /// Writes the classification fields, recomputes SLA deadlines from
    /// the assessed severity (superseding any prior estimate), flags
    /// degraded results for human review, and moves a `New` report to
    /// `Reviewing`. Serialized against concurrent transitions through
    /// the same per-report lock.
    pub async fn apply_analysis(
        &self,
        report_id: Uuid,
        result: &AnalysisResult,
        now: DateTime<Utc>,
    ) -> EngineResult<(Report, Option<CaseHistoryEntry>)> {
        let _lock = self.try_lock(report_id)?;

        let mut report = self.repo.load(report_id).await?;
        if report.is_closed() {
            return Err(EngineError::conflict(format!(
                "report {} is closed; analysis result discarded",
                report.ticket_id
            )));
        }

        report.category = result.category;
        report.fraud_score = Some(result.fraud_score);
        report.priority = Some(result.priority);
        report.needs_human_review = result.is_partial();
        report.analysis = Some(result.clone());
        report.updated_at = now;

        // Setting or changing the severity recomputes the deadline
        // triple from the assessment instant; the new assessment
        // supersedes any prior estimate.
        if result.severity.is_assessed() {
            report.severity = result.severity;
            report.deadlines = deadlines_for(result.severity, now, &self.config.sla);
        }

        let mut entry = None;
        if report.status == ReportStatus::New {
            let history =
                CaseHistoryEntry::new(report_id, ReportStatus::New, ReportStatus::Reviewing,
                    "system", Some("automated analysis ingested".to_string()), now);
            report.status = ReportStatus::Reviewing;
            self.repo.append_history(history.clone()).await?;
            entry = Some(history);
        }

        self.repo.save(&report).await?;
        tracing::info!(
            ticket_id = %report.ticket_id,
            severity = %report.severity,
            category = %report.category,
            needs_human_review = report.needs_human_review,
            "analysis result applied"
        );
        Ok((report, entry))
    }
}
