//! Summary Agent
//!
//! Compiles every prior output into a decision-ready executive summary.
//! Runs last in the pipeline.

use caseguard_core::config::AgentBudget;
use caseguard_llm::{schema_for, StructuredRequest};

use super::context::AnalysisContext;
use crate::models::analysis::ExecutiveSummary;

const SYSTEM_PROMPT: &str = "\
You are the summary agent of a whistleblowing case system. Write a \
concise executive summary for decision makers.

GUIDELINES:
- At most 300 words, formal register, no technical jargon.
- Cover: the core allegation, key findings, the risk, and the \
recommended action.
- key_findings: 3-5 bullet statements, most decision-critical first.
- overall_risk mirrors the assessed severity.

Respond with a single JSON object conforming to the provided schema.";

/// Produces the executive summary.
pub struct SummaryAgent;

impl SummaryAgent {
    pub const NAME: &'static str = "summary";

    /// Build the structured request for this agent.
    pub fn request(ctx: &AnalysisContext, budget: &AgentBudget) -> StructuredRequest {
        let user = format!(
            "VIOLATION REPORT:\n{}\n\nCOMPILED ANALYSIS:\n{}",
            ctx.report_text,
            ctx.prior_digest(),
        );
        StructuredRequest::new(SYSTEM_PROMPT, user, schema_for::<ExecutiveSummary>())
            .with_temperature(budget.temperature)
            .with_max_tokens(budget.max_tokens)
    }

    /// Safe default when the agent degrades.
    pub fn fallback() -> ExecutiveSummary {
        ExecutiveSummary::degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::ValidateOutput;

    #[test]
    fn test_request_compiles_all_prior_output() {
        let mut ctx = AnalysisContext::new("report".to_string());
        ctx.fraud = Some(crate::models::analysis::FraudAnalysis::degraded());
        ctx.compliance = Some(crate::models::analysis::ComplianceFindings::degraded());
        ctx.severity = Some(crate::models::analysis::SeverityAssessment::degraded());
        ctx.recommendations = Some(crate::models::analysis::RecommendationPlan::degraded());
        let request = SummaryAgent::request(&ctx, &AgentBudget::default());
        assert!(request.user.contains("COMPILED ANALYSIS"));
        assert!(request.user.contains("COMPLIANCE"));
        assert!(request.user.contains("RECOMMENDATION"));
    }

    #[test]
    fn test_fallback_is_valid() {
        assert!(SummaryAgent::fallback().validate().is_ok());
    }
}
