//! Escalation Engine
//!
//! Pure rule evaluation: given a report snapshot, the current instant,
//! and the configured policy, decide whether the case routes to a higher
//! tier. The engine performs no I/O and owns no side effects — recording
//! the decision and notifying are the caller's job — which keeps it an
//! independently testable function of its inputs.

use chrono::{DateTime, Utc};

use caseguard_core::config::EscalationPolicy;
use caseguard_core::types::{ActorSeniority, EscalationLevel, SeverityLevel};
use uuid::Uuid;

use crate::models::{EscalationRecord, Report};

/// A triggered escalation, to be recorded and acted on by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationDecision {
    pub level: EscalationLevel,
    /// Rule that fired, for the audit trail.
    pub trigger: String,
    /// Role the case routes to, from the configured matrix.
    pub notify_party: String,
}

impl EscalationDecision {
    /// Materialize the decision as an append-only record.
    pub fn into_record(self, report_id: Uuid, at: DateTime<Utc>) -> EscalationRecord {
        EscalationRecord {
            id: Uuid::new_v4(),
            report_id,
            level: self.level,
            trigger: self.trigger,
            notify_party: self.notify_party,
            at,
        }
    }
}

/// Evaluates escalation rules against report snapshots.
#[derive(Debug, Clone)]
pub struct EscalationEngine {
    policy: EscalationPolicy,
}

impl EscalationEngine {
    pub fn new(policy: EscalationPolicy) -> Self {
        Self { policy }
    }

    /// Evaluate a report snapshot.
    ///
    /// Rules are checked from the highest tier down; the first match
    /// wins. Level 1 is standard handling and yields `None` — no record
    /// is written for it. Closed reports are frozen and never escalate.
    /// Re-running on an unchanged snapshot returns the same decision.
    pub fn evaluate(&self, report: &Report, now: DateTime<Utc>) -> Option<EscalationDecision> {
        if report.is_closed() {
            return None;
        }

        let loss = report
            .analysis
            .as_ref()
            .and_then(|a| a.intake.what.estimated_loss);
        let seniority = report
            .analysis
            .as_ref()
            .map(|a| a.intake.who.most_senior_actor);

        // Level 4: executive involvement or loss above the top threshold.
        if seniority == Some(ActorSeniority::Executive) {
            return Some(self.decision(
                EscalationLevel::Level4,
                "executive leadership named in the report",
            ));
        }
        if loss.is_some_and(|l| l > self.policy.level4_loss_threshold) {
            return Some(self.decision(
                EscalationLevel::Level4,
                format!(
                    "estimated loss above {}",
                    self.policy.level4_loss_threshold
                ),
            ));
        }

        // Level 3: director-grade involvement or loss above the lower
        // threshold.
        if seniority == Some(ActorSeniority::Director) {
            return Some(self.decision(
                EscalationLevel::Level3,
                "director-grade actor named in the report",
            ));
        }
        if loss.is_some_and(|l| l > self.policy.level3_loss_threshold) {
            return Some(self.decision(
                EscalationLevel::Level3,
                format!(
                    "estimated loss above {}",
                    self.policy.level3_loss_threshold
                ),
            ));
        }

        // Level 2: critical severity or any SLA deadline already passed.
        if report.severity == SeverityLevel::Critical {
            return Some(self.decision(EscalationLevel::Level2, "severity assessed CRITICAL"));
        }
        if report
            .deadlines
            .is_some_and(|deadlines| deadlines.any_breached(now))
        {
            return Some(self.decision(EscalationLevel::Level2, "SLA deadline breached"));
        }

        // Level 1: standard handling, no escalation record.
        None
    }

    fn decision(
        &self,
        level: EscalationLevel,
        trigger: impl Into<String>,
    ) -> EscalationDecision {
        EscalationDecision {
            level,
            trigger: trigger.into(),
            notify_party: self.policy.party(level).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use caseguard_core::config::SlaMatrix;
    use caseguard_core::types::{Priority, ReportChannel, ReportStatus, ViolationCategory};

    use crate::models::analysis::*;
    use crate::models::{Report, ReportDraft, SlaDeadlines};
    use crate::services::workflow::sla::deadlines_for;

    fn engine() -> EscalationEngine {
        EscalationEngine::new(EscalationPolicy::default())
    }

    fn report_with(
        severity: SeverityLevel,
        loss: Option<u64>,
        seniority: ActorSeniority,
        deadlines: Option<SlaDeadlines>,
    ) -> Report {
        let mut report = Report::new(
            ReportDraft {
                channel: ReportChannel::Web,
                subject: "subject".to_string(),
                description: "description".to_string(),
                is_anonymous: true,
                reporter_contact: None,
                incident_date: None,
                incident_location: None,
                parties_involved: vec![],
            },
            Utc::now(),
        );
        report.status = ReportStatus::Reviewing;
        report.severity = severity;
        report.deadlines = deadlines;
        report.analysis = Some(AnalysisResult {
            analysis_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            mode: AnalysisMode::Full,
            completion: AnalysisCompletion::Complete,
            category: ViolationCategory::Fraud,
            severity,
            fraud_score: 0.5,
            priority: Priority::derive(severity, 0.5),
            intake: IntakeSummary {
                what: WhatDetails {
                    violation_type: "fraud".to_string(),
                    description: "".to_string(),
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
        });
        report
    }

    #[test]
    fn test_standard_case_no_escalation() {
        let report = report_with(SeverityLevel::Medium, Some(50_000_000), ActorSeniority::Staff, None);
        assert!(engine().evaluate(&report, Utc::now()).is_none());
    }

    #[test]
    fn test_critical_severity_is_level_2() {
        let report = report_with(SeverityLevel::Critical, None, ActorSeniority::Staff, None);
        let decision = engine().evaluate(&report, Utc::now()).unwrap();
        assert_eq!(decision.level, EscalationLevel::Level2);
        assert_eq!(decision.notify_party, "Head of Whistleblowing Unit");
    }

    #[test]
    fn test_sla_breach_is_level_2() {
        let now = Utc::now();
        let deadlines =
            deadlines_for(SeverityLevel::High, now - Duration::days(30), &SlaMatrix::default());
        let report = report_with(SeverityLevel::High, None, ActorSeniority::Staff, deadlines);
        let decision = engine().evaluate(&report, now).unwrap();
        assert_eq!(decision.level, EscalationLevel::Level2);
        assert!(decision.trigger.contains("SLA"));
    }

    #[test]
    fn test_large_loss_is_level_3() {
        let report = report_with(
            SeverityLevel::High,
            Some(600_000_000),
            ActorSeniority::Manager,
            None,
        );
        let decision = engine().evaluate(&report, Utc::now()).unwrap();
        assert_eq!(decision.level, EscalationLevel::Level3);
    }

    #[test]
    fn test_director_is_level_3() {
        let report = report_with(SeverityLevel::Medium, None, ActorSeniority::Director, None);
        let decision = engine().evaluate(&report, Utc::now()).unwrap();
        assert_eq!(decision.level, EscalationLevel::Level3);
    }

    #[test]
    fn test_very_large_loss_is_level_4() {
        let report = report_with(
            SeverityLevel::Critical,
            Some(2_000_000_000),
            ActorSeniority::Manager,
            None,
        );
        let decision = engine().evaluate(&report, Utc::now()).unwrap();
        // Highest tier wins even though CRITICAL alone would be level 2.
        assert_eq!(decision.level, EscalationLevel::Level4);
        assert_eq!(decision.notify_party, "Supervisory Board");
    }

    #[test]
    fn test_executive_is_level_4() {
        let report = report_with(SeverityLevel::Low, None, ActorSeniority::Executive, None);
        let decision = engine().evaluate(&report, Utc::now()).unwrap();
        assert_eq!(decision.level, EscalationLevel::Level4);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // A loss exactly at the threshold does not escalate.
        let report = report_with(
            SeverityLevel::Medium,
            Some(500_000_000),
            ActorSeniority::Staff,
            None,
        );
        assert!(engine().evaluate(&report, Utc::now()).is_none());
    }

    #[test]
    fn test_closed_report_never_escalates() {
        let mut report = report_with(
            SeverityLevel::Critical,
            Some(2_000_000_000),
            ActorSeniority::Executive,
            None,
        );
        report.status = ReportStatus::ClosedProven;
        report.closed_at = Some(Utc::now());
        assert!(engine().evaluate(&report, Utc::now()).is_none());
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let now = Utc::now();
        let report = report_with(
            SeverityLevel::Critical,
            Some(700_000_000),
            ActorSeniority::Staff,
            None,
        );
        let first = engine().evaluate(&report, now);
        for _ in 0..5 {
            assert_eq!(engine().evaluate(&report, now), first);
        }
    }

    #[test]
    fn test_decision_materializes_record() {
        let report = report_with(SeverityLevel::Critical, None, ActorSeniority::Staff, None);
        let now = Utc::now();
        let record = engine()
            .evaluate(&report, now)
            .unwrap()
            .into_record(report.id, now);
        assert_eq!(record.report_id, report.id);
        assert_eq!(record.level, EscalationLevel::Level2);
        assert_eq!(record.at, now);
    }
}
