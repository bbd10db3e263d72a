//! Intake Agent
//!
//! Parses a free-text report into the 4W+1H structure (What, Who, When,
//! Where, How). Runs first: every later agent builds on its extraction.

use caseguard_core::config::AgentBudget;
use caseguard_llm::{schema_for, StructuredRequest};

use super::context::AnalysisContext;
use crate::models::analysis::IntakeSummary;

const SYSTEM_PROMPT: &str = "\
You are the intake agent of a whistleblowing case system. Extract \
structured information from the violation report using the 4W+1H \
framework (what, who, when, where, how).

IMPORTANT:
- Extract only information EXPLICITLY stated in the report.
- Use null for anything the report does not state. Never guess or invent.
- estimated_loss is a plain integer in base currency units, or null.
- most_senior_actor is the highest rank among the reported parties: \
STAFF, MANAGER, DIRECTOR, or EXECUTIVE.
- completeness_score in [0,1] reflects how many of the five elements the \
report actually provides.
- List concrete follow-up questions under clarification_needed.

Respond with a single JSON object conforming to the provided schema.";

/// Extracts the 4W+1H structure from the raw report.
pub struct IntakeAgent;

impl IntakeAgent {
    pub const NAME: &'static str = "intake";

    /// Build the structured request for this agent.
    pub fn request(ctx: &AnalysisContext, budget: &AgentBudget) -> StructuredRequest {
        StructuredRequest::new(
            SYSTEM_PROMPT,
            format!("VIOLATION REPORT:\n\n{}", ctx.report_text),
            schema_for::<IntakeSummary>(),
        )
        .with_temperature(budget.temperature)
        .with_max_tokens(budget.max_tokens)
    }

    /// Safe default when the agent degrades.
    pub fn fallback() -> IntakeSummary {
        IntakeSummary::degraded()
    }
}
