//! Analysis Context
//!
//! Transient per-run aggregate threaded through the pipeline: the report
//! text, the retrieved grounding, and each agent's output appended in
//! order. Owned exclusively by one orchestrator run; each agent receives
//! an immutable snapshot and returns a new value to merge, never mutating
//! shared state in place.

use caseguard_core::types::ViolationCategory;

use crate::models::analysis::{
    ComplianceFindings, FraudAnalysis, IntakeSummary, RecommendationPlan, SeverityAssessment,
};

/// Marker appended when report text is cut at the budget.
const TRUNCATION_MARKER: &str = "\n\n[... content truncated ...]";

/// Truncate report content to stay within the per-call character budget.
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    tracing::warn!(
        original = content.chars().count(),
        max_chars,
        "report content truncated for analysis"
    );
    let cut: String = content.chars().take(max_chars).collect();
    format!("{}{}", cut, TRUNCATION_MARKER)
}

/// Accumulated state of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    /// Report text, already truncated to budget.
    pub report_text: String,
    /// Regulation/policy grounding assembled by the retriever; empty when
    /// no grounding is available.
    pub regulation_context: String,
    /// Rendered snippets of similar historical cases.
    pub similar_cases: Vec<String>,

    pub intake: Option<IntakeSummary>,
    pub fraud: Option<FraudAnalysis>,
    pub compliance: Option<ComplianceFindings>,
    pub severity: Option<SeverityAssessment>,
    pub recommendations: Option<RecommendationPlan>,
}

impl AnalysisContext {
    pub fn new(report_text: String) -> Self {
        Self {
            report_text,
            ..Self::default()
        }
    }

    /// Digest of the intake extraction for downstream prompts.
    pub fn intake_digest(&self) -> String {
        match &self.intake {
            None => "Intake extraction unavailable.".to_string(),
            Some(intake) => {
                let loss = intake
                    .what
                    .estimated_loss
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "not stated".to_string());
                format!(
                    "STRUCTURED INTAKE (4W+1H):\n\
                     - What: {} — {}\n\
                     - Estimated loss: {}\n\
                     - Who: {} (most senior actor: {:?})\n\
                     - When: {}{}\n\
                     - Where: {} / {}\n\
                     - How: {}\n\
                     - Completeness: {:.2}",
                    intake.what.violation_type,
                    intake.what.description,
                    loss,
                    intake.who.reported_parties.join(", "),
                    intake.who.most_senior_actor,
                    intake.when.incident_date.as_deref().unwrap_or("not stated"),
                    if intake.when.is_ongoing { " (ongoing)" } else { "" },
                    intake.where_.location.as_deref().unwrap_or("not stated"),
                    intake.where_.department.as_deref().unwrap_or("not stated"),
                    intake.how.modus_operandi,
                    intake.completeness_score,
                )
            }
        }
    }

    /// Digest of every prior agent output, for the late-pipeline agents.
    pub fn prior_digest(&self) -> String {
        let mut parts = vec![self.intake_digest()];
        if let Some(fraud) = &self.fraud {
            parts.push(format!(
                "FRAUD ANALYSIS:\n- Fraud score: {:.2}\n- Red flags: {}\n- Financial impact: {:?}",
                fraud.fraud_score,
                fraud.red_flags.len(),
                fraud.financial_impact,
            ));
        }
        if let Some(compliance) = &self.compliance {
            let categories: Vec<&str> =
                compliance.categories.iter().map(|c| c.as_str()).collect();
            parts.push(format!(
                "COMPLIANCE:\n- Categories: {}\n- Citations: {}\n- Criminal liability: {}",
                categories.join(", "),
                compliance.citations.len(),
                compliance.criminal_liability,
            ));
        }
        if let Some(severity) = &self.severity {
            parts.push(format!(
                "SEVERITY:\n- Level: {} (score {}/100)\n- Risk: {}",
                severity.level, severity.score, severity.risk_summary,
            ));
        }
        if let Some(recommendations) = &self.recommendations {
            parts.push(format!(
                "RECOMMENDATION:\n- Overall: {:?}\n- Immediate actions: {}\n- Rationale: {}",
                recommendations.overall,
                recommendations.immediate_actions.len(),
                recommendations.rationale,
            ));
        }
        parts.join("\n\n")
    }

    /// Rendered similar-case block, or a placeholder note.
    pub fn similar_cases_digest(&self) -> String {
        if self.similar_cases.is_empty() {
            "No similar historical cases available.".to_string()
        } else {
            format!("SIMILAR HISTORICAL CASES:\n{}", self.similar_cases.join("\n---\n"))
        }
    }
}

/// Keyword fallback for category determination, used when the compliance
/// agent yields no classification.
pub fn category_from_keywords(text: &str) -> ViolationCategory {
    const KEYWORDS: &[(&str, ViolationCategory)] = &[
        ("corrupt", ViolationCategory::Corruption),
        ("bribe", ViolationCategory::Corruption),
        ("kickback", ViolationCategory::Corruption),
        ("embezzle", ViolationCategory::Fraud),
        ("fraud", ViolationCategory::Fraud),
        ("decei", ViolationCategory::Fraud),
        ("gratification", ViolationCategory::Gratification),
        ("gift", ViolationCategory::Gratification),
        ("conflict of interest", ViolationCategory::ConflictOfInterest),
        ("nepotis", ViolationCategory::ConflictOfInterest),
        ("procurement", ViolationCategory::Procurement),
        ("tender", ViolationCategory::Procurement),
        ("data breach", ViolationCategory::DataBreach),
        ("data leak", ViolationCategory::DataBreach),
        ("personal data", ViolationCategory::DataBreach),
        ("ethic", ViolationCategory::Ethics),
        ("harass", ViolationCategory::Misconduct),
        ("disciplin", ViolationCategory::Misconduct),
    ];
    let lower = text.to_lowercase();
    for (keyword, category) in KEYWORDS {
        if lower.contains(keyword) {
            return *category;
        }
    }
    ViolationCategory::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{IntakeSummary, WhatDetails};

    #[test]
    fn test_truncate_content_under_budget() {
        assert_eq!(truncate_content("short", 100), "short");
    }

    #[test]
    fn test_truncate_content_over_budget() {
        let long = "x".repeat(200);
        let out = truncate_content(&long, 50);
        assert!(out.starts_with(&"x".repeat(50)));
        assert!(out.ends_with("[... content truncated ...]"));
    }

    #[test]
    fn test_intake_digest_placeholder_without_intake() {
        let ctx = AnalysisContext::new("report".to_string());
        assert!(ctx.intake_digest().contains("unavailable"));
    }

    #[test]
    fn test_intake_digest_renders_fields() {
        let mut ctx = AnalysisContext::new("report".to_string());
        ctx.intake = Some(IntakeSummary {
            what: WhatDetails {
                violation_type: "Procurement steering".to_string(),
                description: "Tender steered to a related vendor".to_string(),
                estimated_loss: Some(750_000_000),
                evidence_mentioned: vec![],
            },
            ..IntakeSummary::default()
        });
        let digest = ctx.intake_digest();
        assert!(digest.contains("Procurement steering"));
        assert!(digest.contains("750000000"));
    }

    #[test]
    fn test_prior_digest_grows_with_outputs() {
        let mut ctx = AnalysisContext::new("report".to_string());
        let base_len = ctx.prior_digest().len();
        ctx.fraud = Some(crate::models::analysis::FraudAnalysis::degraded());
        assert!(ctx.prior_digest().len() > base_len);
        assert!(ctx.prior_digest().contains("FRAUD ANALYSIS"));
    }

    #[test]
    fn test_category_keyword_fallback() {
        assert_eq!(
            category_from_keywords("Officials took a bribe during the audit"),
            ViolationCategory::Corruption
        );
        assert_eq!(
            category_from_keywords("Irregular tender award process"),
            ViolationCategory::Procurement
        );
        assert_eq!(
            category_from_keywords("Customer personal data was exposed"),
            ViolationCategory::DataBreach
        );
        assert_eq!(
            category_from_keywords("Nothing recognizable here"),
            ViolationCategory::Other
        );
    }
}
