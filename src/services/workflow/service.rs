//! Case Workflow Coordinator
//!
//! Wires the state machine, the escalation engine, the repository, and
//! notification dispatch together: report creation, analysis ingestion
//! (classification, deadlines, escalation), and manual transitions.
//!
//! Degraded (PARTIAL) analyses are never auto-escalated: they flag the
//! report for human review and stop at `Reviewing`. A reviewer can still
//! escalate manually through a transition.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use caseguard_core::config::EngineConfig;
use caseguard_core::types::{EscalationLevel, ReportStatus};

use super::escalation::EscalationEngine;
use super::lifecycle::CaseStateMachine;
use crate::models::{AnalysisResult, CaseHistoryEntry, EscalationRecord, Report, ReportDraft};
use crate::services::repository::{NotificationDispatch, Repository};
use crate::utils::error::EngineResult;

/// Outcome of ingesting an analysis result.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub report: Report,
    /// Escalation recorded for this ingestion, if any rule fired.
    pub escalation: Option<EscalationRecord>,
}

/// Coordinates lifecycle mutations and their side effects.
pub struct CaseWorkflow {
    state: CaseStateMachine,
    escalation: EscalationEngine,
    repo: Arc<dyn Repository>,
    notifier: Arc<dyn NotificationDispatch>,
}

impl CaseWorkflow {
    pub fn new(
        repo: Arc<dyn Repository>,
        notifier: Arc<dyn NotificationDispatch>,
        config: Arc<EngineConfig>,
    ) -> EngineResult<Self> {
        let state = CaseStateMachine::new(repo.clone(), config.clone())?;
        let escalation = EscalationEngine::new(config.escalation.clone());
        Ok(Self {
            state,
            escalation,
            repo,
            notifier,
        })
    }

    /// Create and persist a new report in the `New` status.
    pub async fn create_report(&self, draft: ReportDraft) -> EngineResult<Report> {
        let now = Utc::now();
        let report = Report::new(draft, now);
        self.repo.save(&report).await?;
        self.repo
            .append_history(CaseHistoryEntry::new(
                report.id,
                ReportStatus::New,
                ReportStatus::New,
                "system",
                Some(format!("report received via {}", report.channel)),
                now,
            ))
            .await?;
        tracing::info!(ticket_id = %report.ticket_id, channel = %report.channel, "report created");
        Ok(report)
    }

    /// Ingest an analysis result for a report.
    ///
    /// Applies classification and deadlines through the state machine,
    /// then evaluates escalation — but only for COMPLETE results;
    /// degraded analyses route to human review before any automatic
    /// escalation is trusted. Fired decisions are recorded append-only
    /// and handed to notification dispatch.
    pub async fn ingest_analysis(
        &self,
        report_id: Uuid,
        result: &AnalysisResult,
    ) -> EngineResult<IngestOutcome> {
        let now = Utc::now();
        let (report, entry) = self.state.apply_analysis(report_id, result, now).await?;
        if let Some(entry) = &entry {
            self.notifier.notify_status_change(&report, entry).await?;
        }

        if result.is_partial() {
            tracing::info!(
                ticket_id = %report.ticket_id,
                "degraded analysis: routed to human review, automatic escalation skipped"
            );
            return Ok(IngestOutcome {
                report,
                escalation: None,
            });
        }

        let escalation = match self.escalation.evaluate(&report, now) {
            Some(decision) if decision.level >= EscalationLevel::Level2 => {
                let record = decision.into_record(report.id, now);
                self.repo.append_escalation(record.clone()).await?;
                self.notifier.notify_escalation(&report, &record).await?;
                tracing::info!(
                    ticket_id = %report.ticket_id,
                    level = %record.level,
                    trigger = %record.trigger,
                    "escalation recorded"
                );
                Some(record)
            }
            _ => None,
        };

        Ok(IngestOutcome { report, escalation })
    }

    /// Transition a report and notify on success.
    pub async fn transition(
        &self,
        report_id: Uuid,
        to: ReportStatus,
        actor: &str,
        note: Option<String>,
    ) -> EngineResult<Report> {
        let (report, entry) = self
            .state
            .transition(report_id, to, actor, note, Utc::now())
            .await?;
        self.notifier.notify_status_change(&report, &entry).await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use caseguard_core::types::{
        ActorSeniority, Priority, ReportChannel, SeverityLevel, ViolationCategory,
    };

    use crate::models::analysis::*;
    use crate::services::repository::InMemoryRepository;
    use crate::utils::error::EngineError;

    /// Dispatch stub that records what it was asked to send.
    #[derive(Default)]
    struct RecordingDispatch {
        escalations: Mutex<Vec<EscalationLevel>>,
        status_changes: Mutex<Vec<(ReportStatus, ReportStatus)>>,
    }

    #[async_trait]
    impl NotificationDispatch for RecordingDispatch {
        async fn notify_escalation(
            &self,
            _report: &Report,
            record: &EscalationRecord,
        ) -> EngineResult<()> {
            self.escalations.lock().unwrap().push(record.level);
            Ok(())
        }
        async fn notify_status_change(
            &self,
            _report: &Report,
            entry: &CaseHistoryEntry,
        ) -> EngineResult<()> {
            self.status_changes
                .lock()
                .unwrap()
                .push((entry.old_status, entry.new_status));
            Ok(())
        }
    }

    fn workflow() -> (CaseWorkflow, Arc<InMemoryRepository>, Arc<RecordingDispatch>) {
        let repo = Arc::new(InMemoryRepository::new());
        let dispatch = Arc::new(RecordingDispatch::default());
        let workflow = CaseWorkflow::new(
            repo.clone(),
            dispatch.clone(),
            Arc::new(EngineConfig::default()),
        )
        .unwrap();
        (workflow, repo, dispatch)
    }

    fn draft() -> ReportDraft {
        ReportDraft {
            channel: ReportChannel::Whatsapp,
            subject: "Kickbacks on maintenance contracts".to_string(),
            description: "A director demands a cut of every maintenance contract.".to_string(),
            is_anonymous: true,
            reporter_contact: None,
            incident_date: None,
            incident_location: None,
            parties_involved: vec!["Facilities director".to_string()],
        }
    }

    fn analysis(
        severity: SeverityLevel,
        partial: bool,
        loss: Option<u64>,
        seniority: ActorSeniority,
    ) -> AnalysisResult {
        AnalysisResult {
            analysis_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            mode: AnalysisMode::Full,
            completion: if partial {
                AnalysisCompletion::Partial {
                    degraded_agents: vec!["severity".to_string()],
                }
            } else {
                AnalysisCompletion::Complete
            },
            category: ViolationCategory::Corruption,
            severity,
            fraud_score: 0.7,
            priority: Priority::derive(severity, 0.7),
            intake: IntakeSummary {
                what: WhatDetails {
                    violation_type: "kickbacks".to_string(),
                    description: "contract kickbacks".to_string(),
                    estimated_loss: loss,
                    evidence_mentioned: vec![],
                },
                who: WhoDetails {
                    most_senior_actor: seniority,
                    ..WhoDetails::default()
                },
                ..IntakeSummary::default()
            },
            fraud: FraudAnalysis::degraded(),
            compliance: ComplianceFindings::degraded(),
            severity_assessment: SeverityAssessment::degraded(),
            recommendations: RecommendationPlan::degraded(),
            summary: ExecutiveSummary::degraded(),
            similar_cases: vec![],
            agents_used: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_report_persists_and_logs() {
        let (workflow, repo, _) = workflow();
        let report = workflow.create_report(draft()).await.unwrap();
        assert_eq!(report.status, ReportStatus::New);
        assert_eq!(repo.load(report.id).await.unwrap().id, report.id);
        assert_eq!(repo.history_for(report.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_complete_analysis_escalates_and_notifies() {
        let (workflow, repo, dispatch) = workflow();
        let report = workflow.create_report(draft()).await.unwrap();

        let outcome = workflow
            .ingest_analysis(
                report.id,
                &analysis(SeverityLevel::Critical, false, None, ActorSeniority::Staff),
            )
            .await
            .unwrap();

        assert_eq!(outcome.report.status, ReportStatus::Reviewing);
        let record = outcome.escalation.unwrap();
        assert_eq!(record.level, EscalationLevel::Level2);
        assert_eq!(repo.escalations_for(report.id).await.len(), 1);
        assert_eq!(
            dispatch.escalations.lock().unwrap().as_slice(),
            &[EscalationLevel::Level2]
        );
        // Status-change notification for New -> Reviewing also went out.
        assert_eq!(
            dispatch.status_changes.lock().unwrap().as_slice(),
            &[(ReportStatus::New, ReportStatus::Reviewing)]
        );
    }

    #[tokio::test]
    async fn test_partial_analysis_never_auto_escalates() {
        let (workflow, repo, dispatch) = workflow();
        let report = workflow.create_report(draft()).await.unwrap();

        // Even with conditions that would trigger level 4, a degraded
        // analysis routes to human review instead.
        let outcome = workflow
            .ingest_analysis(
                report.id,
                &analysis(
                    SeverityLevel::Critical,
                    true,
                    Some(5_000_000_000),
                    ActorSeniority::Executive,
                ),
            )
            .await
            .unwrap();

        assert!(outcome.escalation.is_none());
        assert!(outcome.report.needs_human_review);
        assert!(repo.escalations_for(report.id).await.is_empty());
        assert!(dispatch.escalations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_executive_involvement_records_level_4() {
        let (workflow, repo, _) = workflow();
        let report = workflow.create_report(draft()).await.unwrap();
        let outcome = workflow
            .ingest_analysis(
                report.id,
                &analysis(
                    SeverityLevel::High,
                    false,
                    Some(50_000_000),
                    ActorSeniority::Executive,
                ),
            )
            .await
            .unwrap();
        assert_eq!(outcome.escalation.unwrap().level, EscalationLevel::Level4);
        assert_eq!(repo.escalations_for(report.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_standard_analysis_records_nothing() {
        let (workflow, repo, _) = workflow();
        let report = workflow.create_report(draft()).await.unwrap();
        let outcome = workflow
            .ingest_analysis(
                report.id,
                &analysis(
                    SeverityLevel::Medium,
                    false,
                    Some(20_000_000),
                    ActorSeniority::Staff,
                ),
            )
            .await
            .unwrap();
        assert!(outcome.escalation.is_none());
        assert!(repo.escalations_for(report.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_transition_notifies() {
        let (workflow, _, dispatch) = workflow();
        let report = workflow.create_report(draft()).await.unwrap();
        workflow
            .transition(report.id, ReportStatus::Reviewing, "handler", None)
            .await
            .unwrap();
        assert_eq!(
            dispatch.status_changes.lock().unwrap().as_slice(),
            &[(ReportStatus::New, ReportStatus::Reviewing)]
        );
    }

    #[tokio::test]
    async fn test_invalid_transition_surfaces_and_skips_notification() {
        let (workflow, _, dispatch) = workflow();
        let report = workflow.create_report(draft()).await.unwrap();
        let result = workflow
            .transition(report.id, ReportStatus::ClosedProven, "handler", None)
            .await;
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransition { .. })
        ));
        assert!(dispatch.status_changes.lock().unwrap().is_empty());
    }
}
