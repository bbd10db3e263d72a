//! Fraud Analysis Agent
//!
//! Evaluates fraud indicators: red flags, the fraud triangle (pressure,
//! opportunity, rationalization), and the overall fraud score. Grounded
//! in similar historical cases when the retriever has any.

use caseguard_core::config::AgentBudget;
use caseguard_llm::{schema_for, StructuredRequest};

use super::context::AnalysisContext;
use crate::models::analysis::FraudAnalysis;

const SYSTEM_PROMPT: &str = "\
You are the fraud analysis agent of a whistleblowing case system. Assess \
fraud indicators in the report using three lenses:

1. RED FLAGS - concrete warning signs in the reported facts.
2. FRAUD TRIANGLE - pressure, opportunity, rationalization.
3. FINANCIAL IMPACT - the qualitative band of the stated loss.

Fraud score interpretation:
- 0.00-0.30 low indication (insufficient evidence so far)
- 0.31-0.70 medium indication (investigation warranted)
- 0.71-1.00 high indication (priority investigation)

The fraud_score MUST lie in [0,1]. Base it on the reported facts, not on \
speculation. Respond with a single JSON object conforming to the \
provided schema.";

/// Scores fraud likelihood from the report and intake extraction.
pub struct AnalysisAgent;

impl AnalysisAgent {
    pub const NAME: &'static str = "fraud_analysis";

    /// Build the structured request for this agent.
    pub fn request(ctx: &AnalysisContext, budget: &AgentBudget) -> StructuredRequest {
        let user = format!(
            "VIOLATION REPORT:\n{}\n\n{}\n\n{}",
            ctx.report_text,
            ctx.intake_digest(),
            ctx.similar_cases_digest(),
        );
        StructuredRequest::new(SYSTEM_PROMPT, user, schema_for::<FraudAnalysis>())
            .with_temperature(budget.temperature)
            .with_max_tokens(budget.max_tokens)
    }

    /// Safe default when the agent degrades.
    pub fn fallback() -> FraudAnalysis {
        FraudAnalysis::degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::ValidateOutput;

    #[test]
    fn test_request_includes_intake_and_cases() {
        let mut ctx = AnalysisContext::new("Invoices were inflated.".to_string());
        ctx.similar_cases.push("CASE-1: inflated invoices, proven".to_string());
        let request = AnalysisAgent::request(&ctx, &AgentBudget::default());
        assert!(request.user.contains("Invoices were inflated"));
        assert!(request.user.contains("SIMILAR HISTORICAL CASES"));
        assert!(request.system.contains("FRAUD TRIANGLE"));
    }

    #[test]
    fn test_fallback_scores_zero() {
        let fallback = AnalysisAgent::fallback();
        assert!(fallback.validate().is_ok());
        assert_eq!(fallback.fraud_score, 0.0);
    }
}
