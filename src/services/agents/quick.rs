//! Quick Analyzer
//!
//! Single-call fallback producing the same validated output shape as the
//! full pipeline, without cross-agent refinement and with only one top-k
//! grounding lookup. Used when the orchestrator signals degraded mode
//! (cost or latency budget exceeded) and for low-priority channels.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caseguard_core::config::EngineConfig;
use caseguard_core::types::{ActorSeniority, Priority, SeverityLevel, ViolationCategory};
use caseguard_llm::{
    parse_structured, retry_with_backoff, schema_for, LlmProvider, StructuredRequest,
};

use super::context::truncate_content;
use crate::models::analysis::{
    AnalysisCompletion, AnalysisMode, AnalysisResult, ComplianceCitation, ComplianceFindings,
    ConfidenceLevel, EvidenceStrength, ExecutiveSummary, FraudAnalysis, FraudTriangle,
    HowDetails, ImpactCategory, IntakeSummary, InvestigationKind, InvestigationPlan,
    OverallRecommendation, RecommendationPlan, RecommendedAction, SeverityAssessment, Urgency,
    ValidateOutput, WhatDetails, WhenDetails, WhereDetails, WhoDetails,
};
use crate::services::knowledge::RagRetriever;
use crate::utils::error::{EngineError, EngineResult};

const SYSTEM_PROMPT: &str = "\
You are the analyst of a whistleblowing case system, producing a quick \
single-pass assessment of a violation report.

Extract the core facts (what, who, when, where, how), classify the \
violation, assess severity, estimate the fraud score in [0,1], list the \
regulations at issue and the recommended actions, and write a 2-3 \
sentence summary.

You MUST commit to a category and a severity from the enumerated \
values. Consider the stated loss, the seniority of those involved, the \
available evidence, and the organisational impact. Respond with a single \
JSON object conforming to the provided schema.";

/// Flat single-call output shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuickOutput {
    pub what: String,
    pub who: String,
    pub when: Option<String>,
    #[serde(rename = "where")]
    pub where_: Option<String>,
    pub how: String,
    pub category: ViolationCategory,
    pub severity: SeverityLevel,
    pub fraud_score: f64,
    #[serde(default)]
    pub compliance_issues: Vec<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    pub summary: String,
}

impl ValidateOutput for QuickOutput {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.fraud_score) {
            return Err(format!("fraud_score {} outside [0,1]", self.fraud_score));
        }
        if self.severity == SeverityLevel::Unknown {
            return Err("quick analysis must commit to a severity".to_string());
        }
        if self.category == ViolationCategory::Unknown {
            return Err("quick analysis must commit to a category".to_string());
        }
        Ok(())
    }
}

/// Single-call analyzer sharing the full pipeline's output contract.
pub struct QuickAnalyzer {
    provider: Arc<dyn LlmProvider>,
    retriever: Arc<RagRetriever>,
    config: Arc<EngineConfig>,
}

impl QuickAnalyzer {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        retriever: Arc<RagRetriever>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            provider,
            retriever,
            config,
        }
    }

    /// Run the quick analysis.
    ///
    /// Schema validation follows the same contract as the full pipeline:
    /// one corrective retry, but with no per-agent default to fall back
    /// on, a second failure surfaces as a named validation error — a
    /// malformed shape is never returned.
    pub async fn quick_analyze(&self, report_text: &str) -> EngineResult<AnalysisResult> {
        let content = truncate_content(report_text, self.config.agents.max_report_chars);
        let mut degraded: Vec<String> = Vec::new();

        // Single grounding lookup, failing closed.
        let context = match self
            .retriever
            .try_retrieve(&content, None, self.config.retrieval.top_k)
            .await
        {
            Ok(chunks) => self.retriever.build_context(&chunks),
            Err(e) => {
                tracing::warn!(error = %e, "quick analysis grounding unavailable");
                degraded.push("retrieval".to_string());
                String::new()
            }
        };

        let grounding = if context.is_empty() {
            String::new()
        } else {
            format!("\n\nREFERENCE CONTEXT:\n{}", context)
        };
        let request = StructuredRequest::new(
            SYSTEM_PROMPT,
            format!("VIOLATION REPORT:\n{}{}", content, grounding),
            schema_for::<QuickOutput>(),
        )
        .with_temperature(self.config.agents.temperature)
        .with_max_tokens(self.config.agents.max_tokens);

        let output = match self.call_validated(request.clone()).await {
            Ok(output) => output,
            Err(e) if e.is_degradable() => {
                tracing::warn!(error = %e, "quick analysis rejected, retrying with correction");
                let corrected = request.with_correction(&format!(
                    "Your previous response was rejected: {}. Return a single JSON object \
                     that strictly conforms to the schema.",
                    e
                ));
                self.call_validated(corrected).await?
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            severity = %output.severity,
            fraud_score = output.fraud_score,
            "quick analysis finished"
        );
        Ok(expand_output(output, degraded))
    }

    async fn call_validated(&self, request: StructuredRequest) -> EngineResult<QuickOutput> {
        let budget = Duration::from_secs(self.config.agents.call_timeout_secs);
        let provider = self.provider.clone();
        let value = tokio::time::timeout(
            budget,
            retry_with_backoff(2, Duration::from_millis(500), || {
                let provider = provider.clone();
                let request = request.clone();
                async move { provider.complete(request).await }
            }),
        )
        .await
        .map_err(|_| {
            EngineError::timeout(format!(
                "quick analysis exceeded its {}s budget",
                budget.as_secs()
            ))
        })??;
        let output: QuickOutput = parse_structured(value)?;
        output
            .validate()
            .map_err(|reason| EngineError::Validation(format!("quick: {}", reason)))?;
        Ok(output)
    }
}

/// Map the flat quick output onto the composite result shape.
fn expand_output(output: QuickOutput, degraded: Vec<String>) -> AnalysisResult {
    let severity = output.severity;
    let financial_impact = match severity {
        SeverityLevel::Critical => ImpactCategory::Severe,
        SeverityLevel::High => ImpactCategory::Significant,
        SeverityLevel::Medium => ImpactCategory::Moderate,
        SeverityLevel::Low | SeverityLevel::Unknown => ImpactCategory::Minor,
    };
    let priority = Priority::derive(severity, output.fraud_score);

    let provided = [
        !output.what.is_empty(),
        !output.who.is_empty(),
        output.when.is_some(),
        output.where_.is_some(),
        !output.how.is_empty(),
    ];
    let completeness = provided.iter().filter(|p| **p).count() as f64 / provided.len() as f64;

    let intake = IntakeSummary {
        what: WhatDetails {
            violation_type: output.category.as_str().to_string(),
            description: output.what.clone(),
            estimated_loss: None,
            evidence_mentioned: Vec::new(),
        },
        who: WhoDetails {
            reported_parties: vec![output.who.clone()],
            witnesses: Vec::new(),
            affected_parties: Vec::new(),
            most_senior_actor: ActorSeniority::Staff,
        },
        when: WhenDetails {
            incident_date: output.when.clone(),
            incident_period: None,
            is_ongoing: false,
        },
        where_: WhereDetails {
            location: output.where_.clone(),
            department: None,
        },
        how: HowDetails {
            modus_operandi: output.how.clone(),
            process_violated: None,
        },
        completeness_score: completeness,
        missing_elements: Vec::new(),
        clarification_needed: Vec::new(),
    };

    let citations: Vec<ComplianceCitation> = output
        .compliance_issues
        .iter()
        .map(|issue| ComplianceCitation {
            regulation: issue.clone(),
            article: None,
            description: "identified by quick analysis".to_string(),
            severity,
        })
        .collect();

    let actions: Vec<RecommendedAction> = output
        .recommended_actions
        .iter()
        .map(|action| RecommendedAction {
            action: action.clone(),
            responsible_party: "Case Handling Unit".to_string(),
            deadline: None,
            priority,
        })
        .collect();

    AnalysisResult {
        analysis_id: Uuid::new_v4(),
        analyzed_at: Utc::now(),
        mode: AnalysisMode::Quick,
        completion: if degraded.is_empty() {
            AnalysisCompletion::Complete
        } else {
            AnalysisCompletion::Partial {
                degraded_agents: degraded,
            }
        },
        category: output.category,
        severity,
        fraud_score: output.fraud_score,
        priority,
        intake,
        fraud: FraudAnalysis {
            fraud_score: output.fraud_score,
            red_flags: Vec::new(),
            fraud_triangle: FraudTriangle::default(),
            financial_impact,
            confidence: ConfidenceLevel::Medium,
            notes: Some("single-pass quick analysis".to_string()),
        },
        compliance: ComplianceFindings {
            categories: vec![output.category],
            citations,
            criminal_liability: false,
            administrative_liability: false,
            notes: None,
        },
        severity_assessment: SeverityAssessment {
            level: severity,
            score: match severity {
                SeverityLevel::Critical => 90,
                SeverityLevel::High => 70,
                SeverityLevel::Medium => 50,
                _ => 25,
            },
            financial_impact,
            reputational_risk: severity,
            evidence_strength: EvidenceStrength::Moderate,
            escalation_required: severity == SeverityLevel::Critical,
            risk_summary: output.summary.clone(),
        },
        recommendations: RecommendationPlan {
            immediate_actions: actions,
            short_term_actions: Vec::new(),
            investigation: InvestigationPlan {
                kind: InvestigationKind::Preliminary,
                scope: Vec::new(),
                estimated_duration: None,
            },
            overall: if severity == SeverityLevel::Critical {
                OverallRecommendation::Escalate
            } else {
                OverallRecommendation::Investigate
            },
            rationale: "single-pass quick analysis".to_string(),
        },
        summary: ExecutiveSummary {
            title: "Quick analysis".to_string(),
            summary: output.summary,
            key_findings: output.compliance_issues,
            overall_risk: severity,
            recommended_action: output
                .recommended_actions
                .first()
                .cloned()
                .unwrap_or_else(|| "Route to review".to_string()),
            urgency: match severity {
                SeverityLevel::Critical => Urgency::Immediate,
                SeverityLevel::High => Urgency::Urgent,
                SeverityLevel::Medium => Urgency::Normal,
                _ => Urgency::Low,
            },
        },
        similar_cases: Vec::new(),
        agents_used: vec!["quick".to_string()],
    }
}
