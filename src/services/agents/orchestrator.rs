//! Analysis Orchestrator
//!
//! Runs the agents in the fixed order Intake → Fraud → Compliance →
//! Severity → Recommendation → Summary, threading each output into the
//! next agent's context. The pipeline is strictly sequential within one
//! run: every agent depends on the accumulated context of its
//! predecessors.
//!
//! Degradation contract: when an agent's output fails schema validation
//! or its call times out, the orchestrator retries that agent once with a
//! corrective instruction, then substitutes the agent's safe default and
//! marks the result PARTIAL. The pipeline never returns a malformed
//! result silently labelled complete.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use caseguard_core::config::EngineConfig;
use caseguard_core::types::{Priority, ViolationCategory};
use caseguard_llm::{parse_structured, retry_with_backoff, LlmProvider, StructuredRequest};

use super::analysis::AnalysisAgent;
use super::compliance::ComplianceAgent;
use super::context::{category_from_keywords, truncate_content, AnalysisContext};
use super::intake::IntakeAgent;
use super::recommendation::RecommendationAgent;
use super::severity::SeverityAgent;
use super::summary::SummaryAgent;
use crate::models::analysis::{AnalysisCompletion, AnalysisMode, AnalysisResult, ValidateOutput};
use crate::services::knowledge::{DocType, RagRetriever, ScoredChunk};
use crate::utils::error::{EngineError, EngineResult};

/// Degraded-agent marker for a failed retrieval pass.
const RETRIEVAL_STAGE: &str = "retrieval";

/// Transport-level retry attempts inside one agent call.
const CALL_ATTEMPTS: u32 = 2;

/// Coordinates one full multi-agent analysis run.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    retriever: Arc<RagRetriever>,
    config: Arc<EngineConfig>,
}

impl Orchestrator {
    /// Create an orchestrator. Fails fast on a malformed configuration.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        retriever: Arc<RagRetriever>,
        config: Arc<EngineConfig>,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            retriever,
            config,
        })
    }

    /// Run the full pipeline over a report.
    ///
    /// `attachments_text` is appended to the report before truncation.
    /// When `cancel` fires, the in-flight agent call completes but its
    /// result is discarded and the run ends with [`EngineError::Cancelled`].
    pub async fn analyze(
        &self,
        report_text: &str,
        attachments_text: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> EngineResult<AnalysisResult> {
        tracing::info!("starting multi-agent analysis pipeline");
        let mut degraded: Vec<String> = Vec::new();
        let mut agents_used: Vec<String> = Vec::new();

        let mut full_content = report_text.to_string();
        if let Some(attachments) = attachments_text {
            full_content.push_str("\n\n[ATTACHMENTS]:\n");
            full_content.push_str(attachments);
        }
        let full_content = truncate_content(&full_content, self.config.agents.max_report_chars);

        // Grounding pass. Failures degrade to empty context and mark the
        // run PARTIAL; they never abort it.
        let mut ctx = AnalysisContext::new(full_content);
        let mut similar_sources: Vec<String> = Vec::new();
        match self.gather_grounding(&ctx.report_text).await {
            Ok((regulation_context, similar_cases)) => {
                ctx.regulation_context = regulation_context;
                similar_sources = similar_cases
                    .iter()
                    .map(|c| c.chunk.source_id.clone())
                    .collect();
                ctx.similar_cases = similar_cases
                    .iter()
                    .map(|c| format!("[{}] {}", c.chunk.source_id, c.chunk.content))
                    .collect();
            }
            Err(e) => {
                tracing::warn!(error = %e, "grounding unavailable, continuing without context");
                degraded.push(RETRIEVAL_STAGE.to_string());
            }
        }

        // Step 1: intake (must run first).
        self.check_cancelled(cancel)?;
        tracing::info!("step 1: intake agent");
        let intake = self
            .run_step(
                IntakeAgent::NAME,
                IntakeAgent::request(&ctx, &self.config.agents),
                IntakeAgent::fallback,
                &mut degraded,
            )
            .await?;
        agents_used.push(IntakeAgent::NAME.to_string());
        ctx.intake = Some(intake);

        // Step 2: fraud analysis.
        self.check_cancelled(cancel)?;
        tracing::info!("step 2: fraud analysis agent");
        let fraud = self
            .run_step(
                AnalysisAgent::NAME,
                AnalysisAgent::request(&ctx, &self.config.agents),
                AnalysisAgent::fallback,
                &mut degraded,
            )
            .await?;
        agents_used.push(AnalysisAgent::NAME.to_string());
        ctx.fraud = Some(fraud);

        // Step 3: compliance.
        self.check_cancelled(cancel)?;
        tracing::info!("step 3: compliance agent");
        let compliance = self
            .run_step(
                ComplianceAgent::NAME,
                ComplianceAgent::request(&ctx, &self.config.categories, &self.config.agents),
                ComplianceAgent::fallback,
                &mut degraded,
            )
            .await?;
        agents_used.push(ComplianceAgent::NAME.to_string());
        ctx.compliance = Some(compliance);

        // Step 4: severity, capped by the financial-impact assessment.
        self.check_cancelled(cancel)?;
        tracing::info!("step 4: severity agent");
        let severity = self
            .run_step(
                SeverityAgent::NAME,
                SeverityAgent::request(&ctx, &self.config.agents),
                SeverityAgent::fallback,
                &mut degraded,
            )
            .await?
            .normalized();
        agents_used.push(SeverityAgent::NAME.to_string());
        ctx.severity = Some(severity);

        // Step 5: recommendations.
        self.check_cancelled(cancel)?;
        tracing::info!("step 5: recommendation agent");
        let recommendations = self
            .run_step(
                RecommendationAgent::NAME,
                RecommendationAgent::request(&ctx, &self.config.agents),
                RecommendationAgent::fallback,
                &mut degraded,
            )
            .await?;
        agents_used.push(RecommendationAgent::NAME.to_string());
        ctx.recommendations = Some(recommendations);

        // Step 6: executive summary.
        self.check_cancelled(cancel)?;
        tracing::info!("step 6: summary agent");
        let summary = self
            .run_step(
                SummaryAgent::NAME,
                SummaryAgent::request(&ctx, &self.config.agents),
                SummaryAgent::fallback,
                &mut degraded,
            )
            .await?;
        agents_used.push(SummaryAgent::NAME.to_string());

        self.check_cancelled(cancel)?;

        let intake = ctx.intake.take().unwrap_or_else(IntakeAgent::fallback);
        let fraud = ctx.fraud.take().unwrap_or_else(AnalysisAgent::fallback);
        let compliance = ctx
            .compliance
            .take()
            .unwrap_or_else(ComplianceAgent::fallback);
        let severity_assessment = ctx.severity.take().unwrap_or_else(SeverityAgent::fallback);
        let recommendations = ctx
            .recommendations
            .take()
            .unwrap_or_else(RecommendationAgent::fallback);

        let category = derive_category(&compliance.categories, &intake, &degraded);
        let severity = severity_assessment.level;
        let fraud_score = fraud.fraud_score;
        let completion = if degraded.is_empty() {
            AnalysisCompletion::Complete
        } else {
            AnalysisCompletion::Partial {
                degraded_agents: degraded,
            }
        };
        tracing::info!(
            severity = %severity,
            fraud_score,
            category = %category,
            partial = !matches!(completion, AnalysisCompletion::Complete),
            "analysis pipeline finished"
        );

        Ok(AnalysisResult {
            analysis_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            mode: AnalysisMode::Full,
            completion,
            category,
            severity,
            fraud_score,
            priority: Priority::derive(severity, fraud_score),
            intake,
            fraud,
            compliance,
            severity_assessment,
            recommendations,
            summary,
            similar_cases: similar_sources,
            agents_used,
        })
    }

    /// Retrieve the regulation context and similar cases for a run.
    async fn gather_grounding(
        &self,
        report_text: &str,
    ) -> EngineResult<(String, Vec<ScoredChunk>)> {
        let regulations = self
            .retriever
            .try_retrieve(
                report_text,
                Some(DocType::Regulation),
                self.config.retrieval.top_k,
            )
            .await?;
        let similar = self
            .retriever
            .try_retrieve(
                report_text,
                Some(DocType::CaseHistory),
                self.config.retrieval.similar_cases_k,
            )
            .await?;
        Ok((self.retriever.build_context(&regulations), similar))
    }

    /// Run one agent with the retry-then-default degradation contract.
    async fn run_step<T>(
        &self,
        name: &'static str,
        request: StructuredRequest,
        fallback: fn() -> T,
        degraded: &mut Vec<String>,
    ) -> EngineResult<T>
    where
        T: DeserializeOwned + ValidateOutput,
    {
        match self.call_validated(name, request.clone()).await {
            Ok(output) => Ok(output),
            Err(e) if e.is_degradable() => {
                tracing::warn!(agent = name, error = %e, "agent output rejected, retrying with correction");
                let corrected = request.with_correction(&format!(
                    "Your previous response was rejected: {}. Return a single JSON object \
                     that strictly conforms to the schema, respecting every enumerated \
                     value and numeric range.",
                    e
                ));
                match self.call_validated(name, corrected).await {
                    Ok(output) => Ok(output),
                    Err(e2) if e2.is_degradable() => {
                        tracing::warn!(agent = name, error = %e2, "agent degraded to safe default");
                        degraded.push(name.to_string());
                        Ok(fallback())
                    }
                    Err(e2) => Err(e2),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// One bounded, transport-retried, schema-validated agent call.
    async fn call_validated<T>(&self, name: &str, request: StructuredRequest) -> EngineResult<T>
    where
        T: DeserializeOwned + ValidateOutput,
    {
        let budget = Duration::from_secs(self.config.agents.call_timeout_secs);
        let provider = self.provider.clone();
        let value = tokio::time::timeout(
            budget,
            retry_with_backoff(CALL_ATTEMPTS, Duration::from_millis(500), || {
                let provider = provider.clone();
                let request = request.clone();
                async move { provider.complete(request).await }
            }),
        )
        .await
        .map_err(|_| {
            EngineError::timeout(format!(
                "{} agent exceeded its {}s budget",
                name,
                budget.as_secs()
            ))
        })??;

        let output: T = parse_structured(value)?;
        output
            .validate()
            .map_err(|reason| EngineError::Validation(format!("{}: {}", name, reason)))?;
        Ok(output)
    }

    fn check_cancelled(&self, cancel: Option<&CancellationToken>) -> EngineResult<()> {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            tracing::info!("analysis cancelled, discarding in-flight results");
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }
}

/// Primary category: the compliance agent's top classification, else a
/// keyword scan over the intake extraction. A run whose intake degraded
/// has nothing trustworthy to scan and stays `Unknown`.
fn derive_category(
    compliance_categories: &[ViolationCategory],
    intake: &crate::models::analysis::IntakeSummary,
    degraded: &[String],
) -> ViolationCategory {
    if let Some(first) = compliance_categories.first() {
        return *first;
    }
    if degraded.iter().any(|d| d.as_str() == IntakeAgent::NAME) {
        return ViolationCategory::Unknown;
    }
    category_from_keywords(&format!(
        "{} {}",
        intake.what.violation_type, intake.what.description
    ))
}
