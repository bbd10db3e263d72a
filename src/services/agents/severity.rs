//! Severity Agent
//!
//! Assigns the risk level from the accumulated analysis. The stated
//! financial impact is the primary factor; involvement level, reputation
//! risk, and evidence strength are supporting factors. The orchestrator
//! additionally caps the returned level at what the financial-impact band
//! justifies (downgrade only).

use caseguard_core::config::AgentBudget;
use caseguard_llm::{schema_for, StructuredRequest};

use super::context::AnalysisContext;
use crate::models::analysis::SeverityAssessment;

const SYSTEM_PROMPT: &str = "\
You are the severity assessment agent of a whistleblowing case system. \
Determine the severity level of the report.

SEVERITY MATRIX (financial impact is the PRIMARY factor):
- LOW: loss below 10 million, no senior officials involved
- MEDIUM: loss 10-100 million, or a manager involved
- HIGH: loss 100 million - 1 billion, or a director involved
- CRITICAL: loss above 1 billion, OR executive leadership involved

Supporting factors: involvement level, reputational exposure, evidence \
strength, and the fraud score. The fraud score is supporting evidence, \
NOT the primary driver: a 500 million loss is HIGH even with a high \
fraud score.

You MUST commit to one of LOW, MEDIUM, HIGH, CRITICAL and give a \
composite score in 0-100. Respond with a single JSON object conforming \
to the provided schema.";

/// Assigns the severity level and composite risk score.
pub struct SeverityAgent;

impl SeverityAgent {
    pub const NAME: &'static str = "severity";

    /// Build the structured request for this agent.
    pub fn request(ctx: &AnalysisContext, budget: &AgentBudget) -> StructuredRequest {
        let user = format!(
            "VIOLATION REPORT:\n{}\n\nPRIOR ANALYSIS:\n{}",
            ctx.report_text,
            ctx.prior_digest(),
        );
        StructuredRequest::new(SYSTEM_PROMPT, user, schema_for::<SeverityAssessment>())
            .with_temperature(budget.temperature)
            .with_max_tokens(budget.max_tokens)
    }

    /// Safe default when the agent degrades: severity stays `Unknown`
    /// and the case routes to human review.
    pub fn fallback() -> SeverityAssessment {
        SeverityAssessment::degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseguard_core::types::SeverityLevel;

    #[test]
    fn test_request_carries_prior_analysis() {
        let mut ctx = AnalysisContext::new("Large contract split to evade thresholds.".to_string());
        ctx.fraud = Some(crate::models::analysis::FraudAnalysis::degraded());
        let request = SeverityAgent::request(&ctx, &AgentBudget::default());
        assert!(request.user.contains("PRIOR ANALYSIS"));
        assert!(request.user.contains("FRAUD ANALYSIS"));
        assert!(request.system.contains("SEVERITY MATRIX"));
    }

    #[test]
    fn test_fallback_is_unknown() {
        assert_eq!(SeverityAgent::fallback().level, SeverityLevel::Unknown);
    }
}
