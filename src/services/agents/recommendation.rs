//! Recommendation Agent
//!
//! Turns the accumulated analysis into an ordered action plan: immediate
//! actions, short-term actions, and the investigation scoping, informed
//! by similar historical cases.

use caseguard_core::config::AgentBudget;
use caseguard_llm::{schema_for, StructuredRequest};

use super::context::AnalysisContext;
use crate::models::analysis::RecommendationPlan;

const SYSTEM_PROMPT: &str = "\
You are the recommendation agent of a whistleblowing case system. \
Produce an actionable plan from the analysis so far.

- immediate_actions: within 24 hours (evidence preservation, escalation, \
suspension of affected processes).
- short_term_actions: within 1-7 days (reporter clarification, initial \
data collection, coordination).
- investigation: scope and depth matched to the severity and evidence.
- overall: one of PROCEED, INVESTIGATE, ESCALATE, HOLD, CLOSE, with the \
rationale spelled out.

Where similar historical cases are provided, reuse what worked. Respond \
with a single JSON object conforming to the provided schema.";

/// Generates the recommended action plan.
pub struct RecommendationAgent;

impl RecommendationAgent {
    pub const NAME: &'static str = "recommendation";

    /// Build the structured request for this agent.
    pub fn request(ctx: &AnalysisContext, budget: &AgentBudget) -> StructuredRequest {
        let user = format!(
            "VIOLATION REPORT:\n{}\n\nPRIOR ANALYSIS:\n{}\n\n{}",
            ctx.report_text,
            ctx.prior_digest(),
            ctx.similar_cases_digest(),
        );
        StructuredRequest::new(SYSTEM_PROMPT, user, schema_for::<RecommendationPlan>())
            .with_temperature(budget.temperature)
            .with_max_tokens(budget.max_tokens)
    }

    /// Safe default when the agent degrades.
    pub fn fallback() -> RecommendationPlan {
        RecommendationPlan::degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::OverallRecommendation;

    #[test]
    fn test_request_contains_prior_and_cases() {
        let mut ctx = AnalysisContext::new("report text".to_string());
        ctx.severity = Some(crate::models::analysis::SeverityAssessment::degraded());
        ctx.similar_cases.push("CASE-7: suspension then audit".to_string());
        let request = RecommendationAgent::request(&ctx, &AgentBudget::default());
        assert!(request.user.contains("SEVERITY"));
        assert!(request.user.contains("CASE-7"));
    }

    #[test]
    fn test_fallback_routes_to_investigation() {
        let fallback = RecommendationAgent::fallback();
        assert_eq!(fallback.overall, OverallRecommendation::Investigate);
        assert!(fallback.immediate_actions.is_empty());
    }
}
