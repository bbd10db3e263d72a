//! Analysis Output Types
//!
//! Strict, typed output schemas for each analysis agent and the composite
//! [`AnalysisResult`]. The original loosely-typed LLM JSON is
//! re-architected here as tagged variants and closed enumerations,
//! validated at the orchestrator boundary: an out-of-range fraud score or
//! an unknown severity is a schema failure, never silently stored.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caseguard_core::types::{ActorSeniority, Priority, SeverityLevel, ViolationCategory};

/// Validation hook every agent output implements.
///
/// The orchestrator treats `Err` the same way as a serde shape mismatch:
/// one corrective retry, then the agent's safe default.
pub trait ValidateOutput {
    fn validate(&self) -> Result<(), String>;
}

// ---------------------------------------------------------------------------
// Intake (4W+1H)
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WhatDetails {
    /// Kind of violation as stated by the reporter.
    pub violation_type: String,
    pub description: String,
    /// Estimated loss in base currency units, when the report states one.
    pub estimated_loss: Option<u64>,
    #[serde(default)]
    pub evidence_mentioned: Vec<String>,
}

/// Who is involved.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WhoDetails {
    #[serde(default)]
    pub reported_parties: Vec<String>,
    #[serde(default)]
    pub witnesses: Vec<String>,
    #[serde(default)]
    pub affected_parties: Vec<String>,
    /// Seniority of the most senior actor named in the report.
    pub most_senior_actor: ActorSeniority,
}

impl Default for WhoDetails {
    fn default() -> Self {
        Self {
            reported_parties: Vec::new(),
            witnesses: Vec::new(),
            affected_parties: Vec::new(),
            most_senior_actor: ActorSeniority::Staff,
        }
    }
}

/// When it happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WhenDetails {
    pub incident_date: Option<String>,
    /// Period for recurring incidents.
    pub incident_period: Option<String>,
    #[serde(default)]
    pub is_ongoing: bool,
}

/// Where it happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WhereDetails {
    pub location: Option<String>,
    pub department: Option<String>,
}

/// How it was done.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HowDetails {
    pub modus_operandi: String,
    pub process_violated: Option<String>,
}

/// Structured 4W+1H extraction of a free-text report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IntakeSummary {
    pub what: WhatDetails,
    pub who: WhoDetails,
    pub when: WhenDetails,
    #[serde(rename = "where")]
    pub where_: WhereDetails,
    pub how: HowDetails,
    /// How complete the report is, 0.0-1.0.
    pub completeness_score: f64,
    #[serde(default)]
    pub missing_elements: Vec<String>,
    #[serde(default)]
    pub clarification_needed: Vec<String>,
}

impl ValidateOutput for IntakeSummary {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.completeness_score) {
            return Err(format!(
                "completeness_score {} outside [0,1]",
                self.completeness_score
            ));
        }
        Ok(())
    }
}

impl IntakeSummary {
    /// Safe default substituted when intake parsing degrades.
    pub fn degraded() -> Self {
        Self {
            what: WhatDetails {
                violation_type: "Unparsed".to_string(),
                ..WhatDetails::default()
            },
            missing_elements: vec!["intake parsing failed".to_string()],
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Fraud analysis
// ---------------------------------------------------------------------------

/// Qualitative financial impact bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactCategory {
    Negligible,
    Minor,
    Moderate,
    Significant,
    Severe,
}

impl ImpactCategory {
    /// The severity level a financial-impact band supports on its own.
    ///
    /// Used to cap the severity agent's level: an assessment is never
    /// upgraded past what the stated loss justifies.
    pub fn implied_severity(&self) -> SeverityLevel {
        match self {
            ImpactCategory::Negligible | ImpactCategory::Minor => SeverityLevel::Low,
            ImpactCategory::Moderate => SeverityLevel::Medium,
            ImpactCategory::Significant => SeverityLevel::High,
            ImpactCategory::Severe => SeverityLevel::Critical,
        }
    }
}

/// Confidence grade for an agent's own output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// A warning sign identified in the report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RedFlag {
    pub flag: String,
    pub severity: SeverityLevel,
}

/// One leg of the fraud triangle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TriangleFactor {
    pub identified: bool,
    pub description: Option<String>,
}

/// Pressure / opportunity / rationalization decomposition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FraudTriangle {
    pub pressure: TriangleFactor,
    pub opportunity: TriangleFactor,
    pub rationalization: TriangleFactor,
}

/// Fraud indicator analysis with the overall fraud score.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FraudAnalysis {
    /// Fraud likelihood in [0,1]. Out-of-range values are rejected at
    /// validation, not clamped.
    pub fraud_score: f64,
    #[serde(default)]
    pub red_flags: Vec<RedFlag>,
    #[serde(default)]
    pub fraud_triangle: FraudTriangle,
    pub financial_impact: ImpactCategory,
    pub confidence: ConfidenceLevel,
    pub notes: Option<String>,
}

impl ValidateOutput for FraudAnalysis {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.fraud_score) {
            return Err(format!("fraud_score {} outside [0,1]", self.fraud_score));
        }
        Ok(())
    }
}

impl FraudAnalysis {
    /// Safe default substituted when fraud analysis degrades.
    pub fn degraded() -> Self {
        Self {
            fraud_score: 0.0,
            red_flags: Vec::new(),
            fraud_triangle: FraudTriangle::default(),
            financial_impact: ImpactCategory::Negligible,
            confidence: ConfidenceLevel::Low,
            notes: Some("fraud analysis degraded to default".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Compliance
// ---------------------------------------------------------------------------

/// A regulation reference the report potentially violates.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComplianceCitation {
    pub regulation: String,
    pub article: Option<String>,
    pub description: String,
    pub severity: SeverityLevel,
}

/// Regulatory assessment of the report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ComplianceFindings {
    /// Violation categories in descending order of confidence.
    #[serde(default)]
    pub categories: Vec<ViolationCategory>,
    #[serde(default)]
    pub citations: Vec<ComplianceCitation>,
    #[serde(default)]
    pub criminal_liability: bool,
    #[serde(default)]
    pub administrative_liability: bool,
    pub notes: Option<String>,
}

impl ValidateOutput for ComplianceFindings {
    fn validate(&self) -> Result<(), String> {
        if self
            .categories
            .iter()
            .any(|c| *c == ViolationCategory::Unknown)
        {
            return Err("UNKNOWN is not a valid category classification".to_string());
        }
        Ok(())
    }
}

impl ComplianceFindings {
    /// Safe default substituted when the compliance check degrades.
    pub fn degraded() -> Self {
        Self {
            notes: Some("compliance check degraded to default".to_string()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How strong the available evidence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

/// Risk assessment with the assigned severity level.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SeverityAssessment {
    pub level: SeverityLevel,
    /// Composite risk score, 0-100.
    pub score: u8,
    pub financial_impact: ImpactCategory,
    pub reputational_risk: SeverityLevel,
    pub evidence_strength: EvidenceStrength,
    pub escalation_required: bool,
    pub risk_summary: String,
}

impl ValidateOutput for SeverityAssessment {
    fn validate(&self) -> Result<(), String> {
        if self.level == SeverityLevel::Unknown {
            return Err("severity agent must commit to an assessed level".to_string());
        }
        if self.score > 100 {
            return Err(format!("score {} outside 0-100", self.score));
        }
        Ok(())
    }
}

impl SeverityAssessment {
    /// Cap the level at what the stated financial impact justifies.
    ///
    /// Downgrade only: a model that overestimates (CRITICAL on a moderate
    /// loss) is corrected; one that underestimates is left alone, since
    /// non-financial factors may legitimately lower the level.
    pub fn normalized(mut self) -> Self {
        let cap = self.financial_impact.implied_severity();
        if self.level > cap {
            tracing::info!(
                assessed = %self.level,
                capped = %cap,
                "severity capped by financial impact assessment"
            );
            self.level = cap;
        }
        self
    }

    /// Safe default substituted when severity assessment degrades.
    pub fn degraded() -> Self {
        Self {
            level: SeverityLevel::Unknown,
            score: 0,
            financial_impact: ImpactCategory::Negligible,
            reputational_risk: SeverityLevel::Unknown,
            evidence_strength: EvidenceStrength::Weak,
            escalation_required: false,
            risk_summary: "severity assessment degraded to default".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// A single recommended action.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendedAction {
    pub action: String,
    pub responsible_party: String,
    pub deadline: Option<String>,
    pub priority: Priority,
}

/// Depth of investigation recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestigationKind {
    Preliminary,
    Standard,
    Comprehensive,
}

/// Investigation scoping.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InvestigationPlan {
    pub kind: InvestigationKind,
    #[serde(default)]
    pub scope: Vec<String>,
    pub estimated_duration: Option<String>,
}

/// Overall disposition recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallRecommendation {
    Proceed,
    Investigate,
    Escalate,
    Hold,
    Close,
}

/// Ordered action plan produced from the full analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationPlan {
    #[serde(default)]
    pub immediate_actions: Vec<RecommendedAction>,
    #[serde(default)]
    pub short_term_actions: Vec<RecommendedAction>,
    pub investigation: InvestigationPlan,
    pub overall: OverallRecommendation,
    pub rationale: String,
}

impl ValidateOutput for RecommendationPlan {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl RecommendationPlan {
    /// Safe default substituted when recommendation generation degrades.
    pub fn degraded() -> Self {
        Self {
            immediate_actions: Vec::new(),
            short_term_actions: Vec::new(),
            investigation: InvestigationPlan {
                kind: InvestigationKind::Preliminary,
                scope: Vec::new(),
                estimated_duration: None,
            },
            overall: OverallRecommendation::Investigate,
            rationale: "recommendation generation degraded to default".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Executive summary
// ---------------------------------------------------------------------------

/// Urgency grade for the executive summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Immediate,
    Urgent,
    Normal,
    Low,
}

/// Decision-ready executive summary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecutiveSummary {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    pub overall_risk: SeverityLevel,
    pub recommended_action: String,
    pub urgency: Urgency,
}

impl ValidateOutput for ExecutiveSummary {
    fn validate(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("executive summary must not be empty".to_string());
        }
        Ok(())
    }
}

impl ExecutiveSummary {
    /// Safe default substituted when summarisation degrades.
    pub fn degraded() -> Self {
        Self {
            title: "Analysis incomplete".to_string(),
            summary: "The automated analysis degraded before a summary could be produced; \
                      manual review of the report text is required."
                .to_string(),
            key_findings: Vec::new(),
            overall_risk: SeverityLevel::Unknown,
            recommended_action: "Route to manual review".to_string(),
            urgency: Urgency::Normal,
        }
    }
}

// ---------------------------------------------------------------------------
// Composite result
// ---------------------------------------------------------------------------

/// Whether the pipeline produced every agent output or substituted
/// defaults along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisCompletion {
    /// Every agent produced schema-valid output.
    Complete,
    /// One or more agents degraded to their safe default.
    Partial {
        /// Names of the degraded agents.
        degraded_agents: Vec<String>,
    },
}

/// Which pipeline produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMode {
    /// Full multi-agent pipeline.
    Full,
    /// Single-call quick analysis.
    Quick,
}

/// Consolidated output of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub mode: AnalysisMode,
    pub completion: AnalysisCompletion,

    // Derived headline metrics.
    pub category: ViolationCategory,
    pub severity: SeverityLevel,
    pub fraud_score: f64,
    pub priority: Priority,

    // Per-agent outputs.
    pub intake: IntakeSummary,
    pub fraud: FraudAnalysis,
    pub compliance: ComplianceFindings,
    pub severity_assessment: SeverityAssessment,
    pub recommendations: RecommendationPlan,
    pub summary: ExecutiveSummary,

    /// Source ids of similar historical cases used for grounding.
    #[serde(default)]
    pub similar_cases: Vec<String>,
    /// Agents that ran, in pipeline order.
    #[serde(default)]
    pub agents_used: Vec<String>,
}

impl AnalysisResult {
    /// Whether any agent degraded to a default.
    pub fn is_partial(&self) -> bool {
        matches!(self.completion, AnalysisCompletion::Partial { .. })
    }
}
