//! Repository and Notification Seams
//!
//! Capability-typed collaborator contracts: persistence and notification
//! fan-out live outside the engine. The in-memory implementations here
//! serve tests and embedded deployments; production backends must honour
//! the same single-writer-per-report property the lifecycle state machine
//! relies on.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{CaseHistoryEntry, EscalationRecord, Report};
use crate::utils::error::{EngineError, EngineResult};

/// Persistence contract for reports and their append-only satellites.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Load a report by internal id.
    async fn load(&self, report_id: Uuid) -> EngineResult<Report>;

    /// Persist a report (insert or replace by id).
    async fn save(&self, report: &Report) -> EngineResult<()>;

    /// Append a case-history entry. The history log is append-only.
    async fn append_history(&self, entry: CaseHistoryEntry) -> EngineResult<()>;

    /// Append an escalation record. Records are never mutated.
    async fn append_escalation(&self, record: EscalationRecord) -> EngineResult<()>;
}

/// Receives workflow events for fan-out to configured channels.
///
/// The engine only produces these events; delivery (email, chat, webhook)
/// is the implementor's concern.
#[async_trait]
pub trait NotificationDispatch: Send + Sync {
    /// An escalation decision was recorded for a report.
    async fn notify_escalation(
        &self,
        report: &Report,
        record: &EscalationRecord,
    ) -> EngineResult<()>;

    /// A report's status changed.
    async fn notify_status_change(
        &self,
        report: &Report,
        entry: &CaseHistoryEntry,
    ) -> EngineResult<()>;
}

/// Dispatch that only logs. Default for tests and embedded use.
#[derive(Debug, Default)]
pub struct LogDispatch;

#[async_trait]
impl NotificationDispatch for LogDispatch {
    async fn notify_escalation(
        &self,
        report: &Report,
        record: &EscalationRecord,
    ) -> EngineResult<()> {
        tracing::info!(
            ticket_id = %report.ticket_id,
            level = %record.level,
            party = %record.notify_party,
            "escalation notification"
        );
        Ok(())
    }

    async fn notify_status_change(
        &self,
        report: &Report,
        entry: &CaseHistoryEntry,
    ) -> EngineResult<()> {
        tracing::info!(
            ticket_id = %report.ticket_id,
            from = %entry.old_status,
            to = %entry.new_status,
            "status change notification"
        );
        Ok(())
    }
}

/// In-memory repository for tests and embedded deployments.
#[derive(Default)]
pub struct InMemoryRepository {
    reports: RwLock<HashMap<Uuid, Report>>,
    history: RwLock<Vec<CaseHistoryEntry>>,
    escalations: RwLock<Vec<EscalationRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a report by its public ticket id.
    pub async fn find_by_ticket(&self, ticket_id: &str) -> Option<Report> {
        self.reports
            .read()
            .await
            .values()
            .find(|r| r.ticket_id.eq_ignore_ascii_case(ticket_id))
            .cloned()
    }

    /// History entries for one report, in append order.
    pub async fn history_for(&self, report_id: Uuid) -> Vec<CaseHistoryEntry> {
        self.history
            .read()
            .await
            .iter()
            .filter(|e| e.report_id == report_id)
            .cloned()
            .collect()
    }

    /// Escalation records for one report, in append order.
    pub async fn escalations_for(&self, report_id: Uuid) -> Vec<EscalationRecord> {
        self.escalations
            .read()
            .await
            .iter()
            .filter(|e| e.report_id == report_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn load(&self, report_id: Uuid) -> EngineResult<Report> {
        self.reports
            .read()
            .await
            .get(&report_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(format!("report {}", report_id)))
    }

    async fn save(&self, report: &Report) -> EngineResult<()> {
        self.reports
            .write()
            .await
            .insert(report.id, report.clone());
        Ok(())
    }

    async fn append_history(&self, entry: CaseHistoryEntry) -> EngineResult<()> {
        self.history.write().await.push(entry);
        Ok(())
    }

    async fn append_escalation(&self, record: EscalationRecord) -> EngineResult<()> {
        self.escalations.write().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportDraft;
    use caseguard_core::types::{ReportChannel, ReportStatus};
    use chrono::Utc;

    fn sample_report() -> Report {
        Report::new(
            ReportDraft {
                channel: ReportChannel::Email,
                subject: "Suspicious invoice approvals".to_string(),
                description: "Invoices approved without supporting documents.".to_string(),
                is_anonymous: true,
                reporter_contact: None,
                incident_date: None,
                incident_location: None,
                parties_involved: vec![],
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let repo = InMemoryRepository::new();
        let report = sample_report();
        repo.save(&report).await.unwrap();
        let loaded = repo.load(report.id).await.unwrap();
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.ticket_id, report.ticket_id);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let repo = InMemoryRepository::new();
        let result = repo.load(Uuid::new_v4()).await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_ticket_case_insensitive() {
        let repo = InMemoryRepository::new();
        let report = sample_report();
        repo.save(&report).await.unwrap();
        let found = repo
            .find_by_ticket(&report.ticket_id.to_lowercase())
            .await
            .unwrap();
        assert_eq!(found.id, report.id);
        assert!(repo.find_by_ticket("NOSUCH00").await.is_none());
    }

    #[tokio::test]
    async fn test_history_is_append_only_per_report() {
        let repo = InMemoryRepository::new();
        let report = sample_report();
        let now = Utc::now();
        repo.append_history(CaseHistoryEntry::new(
            report.id,
            ReportStatus::New,
            ReportStatus::Reviewing,
            "handler",
            None,
            now,
        ))
        .await
        .unwrap();
        repo.append_history(CaseHistoryEntry::new(
            Uuid::new_v4(),
            ReportStatus::New,
            ReportStatus::Hold,
            "handler",
            None,
            now,
        ))
        .await
        .unwrap();

        let entries = repo.history_for(report.id).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].new_status, ReportStatus::Reviewing);
    }
}
