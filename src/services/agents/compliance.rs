//! Compliance Agent
//!
//! Identifies which regulations and policies the reported conduct
//! potentially violates. Grounded in regulation chunks retrieved from the
//! knowledge base; the category catalog from the engine configuration is
//! embedded in the prompt so classifications stay inside the closed set.

use caseguard_core::config::{AgentBudget, CategoryInfo};
use caseguard_llm::{schema_for, StructuredRequest};

use super::context::AnalysisContext;
use crate::models::analysis::ComplianceFindings;

const SYSTEM_PROMPT: &str = "\
You are the compliance agent of a whistleblowing case system. Identify \
the regulations and internal policies the reported conduct potentially \
violates.

- Classify the report into one or more of the catalog categories below, \
most confident first. Never invent categories outside the catalog.
- Cite each potentially violated regulation with its article where the \
grounding context names one, and quote the report evidence supporting it.
- Set criminal_liability / administrative_liability from the cited \
regulations.

Respond with a single JSON object conforming to the provided schema.";

/// Maps the report onto the regulation catalog.
pub struct ComplianceAgent;

impl ComplianceAgent {
    pub const NAME: &'static str = "compliance";

    /// Build the structured request for this agent.
    ///
    /// `catalog` is the configured category reference; `ctx` carries the
    /// regulation chunks the retriever found (possibly none).
    pub fn request(
        ctx: &AnalysisContext,
        catalog: &[CategoryInfo],
        budget: &AgentBudget,
    ) -> StructuredRequest {
        let catalog_block = catalog
            .iter()
            .map(|info| {
                format!(
                    "- {}: {} ({}) [{}]",
                    info.category,
                    info.name,
                    info.description,
                    info.legal_basis.join("; "),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let grounding = if ctx.regulation_context.is_empty() {
            "No retrieved regulation context; rely on the catalog only.".to_string()
        } else {
            format!("RETRIEVED REGULATION CONTEXT:\n{}", ctx.regulation_context)
        };

        let system = format!("{}\n\nCATEGORY CATALOG:\n{}", SYSTEM_PROMPT, catalog_block);
        let user = format!(
            "VIOLATION REPORT:\n{}\n\n{}\n\n{}",
            ctx.report_text,
            ctx.intake_digest(),
            grounding,
        );
        StructuredRequest::new(system, user, schema_for::<ComplianceFindings>())
            .with_temperature(budget.temperature)
            .with_max_tokens(budget.max_tokens)
    }

    /// Safe default when the agent degrades.
    pub fn fallback() -> ComplianceFindings {
        ComplianceFindings::degraded()
    }
}
