//! Engine Configuration
//!
//! All constants the workflow, escalation, retrieval, and agent layers
//! consume live here as one injected structure. Nothing in the engine
//! reads ambient module state: the state machine and escalation engine
//! stay pure functions of their inputs plus this configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{EscalationLevel, SeverityLevel, ViolationCategory};

/// SLA window for one severity level.
///
/// Hours/days are measured from the moment the severity is assessed, not
/// from report creation: the initial assessment supersedes any prior
/// estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaWindow {
    /// Maximum hours until the first response.
    pub initial_response_hours: i64,
    /// Maximum days until the review is finished.
    pub review_deadline_days: i64,
    /// Maximum days until the investigation is finished.
    pub investigation_deadline_days: i64,
}

/// SLA matrix keyed by assessed severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaMatrix {
    pub critical: SlaWindow,
    pub high: SlaWindow,
    pub medium: SlaWindow,
    pub low: SlaWindow,
}

impl SlaMatrix {
    /// The SLA window for a severity, `None` for `Unknown`.
    pub fn window(&self, severity: SeverityLevel) -> Option<&SlaWindow> {
        match severity {
            SeverityLevel::Critical => Some(&self.critical),
            SeverityLevel::High => Some(&self.high),
            SeverityLevel::Medium => Some(&self.medium),
            SeverityLevel::Low => Some(&self.low),
            SeverityLevel::Unknown => None,
        }
    }
}

impl Default for SlaMatrix {
    fn default() -> Self {
        Self {
            critical: SlaWindow {
                initial_response_hours: 4,
                review_deadline_days: 1,
                investigation_deadline_days: 7,
            },
            high: SlaWindow {
                initial_response_hours: 24,
                review_deadline_days: 3,
                investigation_deadline_days: 14,
            },
            medium: SlaWindow {
                initial_response_hours: 72,
                review_deadline_days: 7,
                investigation_deadline_days: 30,
            },
            low: SlaWindow {
                initial_response_hours: 168,
                review_deadline_days: 14,
                investigation_deadline_days: 90,
            },
        }
    }
}

/// Escalation thresholds and the routing matrix.
///
/// Loss thresholds are in the organisation's base currency unit. The
/// party strings name organisational roles; notification fan-out happens
/// outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Loss above this amount routes to level 3.
    pub level3_loss_threshold: u64,
    /// Loss above this amount routes to level 4.
    pub level4_loss_threshold: u64,
    /// Role handling standard cases (level 1).
    pub level1_party: String,
    /// Role notified on SLA breach or critical severity (level 2).
    pub level2_party: String,
    /// Role notified when director-grade actors or large losses are
    /// involved (level 3).
    pub level3_party: String,
    /// Role notified when executives or very large losses are involved
    /// (level 4).
    pub level4_party: String,
}

impl EscalationPolicy {
    /// Responsible party for an escalation level.
    pub fn party(&self, level: EscalationLevel) -> &str {
        match level {
            EscalationLevel::Level1 => &self.level1_party,
            EscalationLevel::Level2 => &self.level2_party,
            EscalationLevel::Level3 => &self.level3_party,
            EscalationLevel::Level4 => &self.level4_party,
        }
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            level3_loss_threshold: 500_000_000,
            level4_loss_threshold: 1_000_000_000,
            level1_party: "Case Handling Unit".to_string(),
            level2_party: "Head of Whistleblowing Unit".to_string(),
            level3_party: "Executive Board Member for Compliance".to_string(),
            level4_party: "Supervisory Board".to_string(),
        }
    }
}

/// Bounds for knowledge retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of chunks retrieved per query.
    pub top_k: usize,
    /// Hard upper bound on `k` regardless of caller input.
    pub max_k: usize,
    /// Number of similar historical cases retrieved for grounding.
    pub similar_cases_k: usize,
    /// Minimum cosine similarity for a chunk to count as relevant.
    pub min_similarity: f32,
    /// Character budget for the assembled context string.
    pub max_context_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_k: 10,
            similar_cases_k: 3,
            min_similarity: 0.5,
            max_context_chars: 6_000,
        }
    }
}

/// Per-call budget for analysis agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentBudget {
    /// Timeout for a single agent call, in seconds.
    pub call_timeout_secs: u64,
    /// Report text beyond this many characters is truncated before it is
    /// handed to any agent.
    pub max_report_chars: usize,
    /// Sampling temperature for analysis calls.
    pub temperature: f32,
    /// Maximum output tokens per call.
    pub max_tokens: u32,
}

impl Default for AgentBudget {
    fn default() -> Self {
        Self {
            call_timeout_secs: 60,
            max_report_chars: 15_000,
            temperature: 0.1,
            max_tokens: 2_048,
        }
    }
}

/// Reference metadata for a violation category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub category: ViolationCategory,
    pub name: String,
    pub description: String,
    /// Regulations and policies the category is grounded in.
    pub legal_basis: Vec<String>,
}

impl CategoryInfo {
    fn new(
        category: ViolationCategory,
        name: &str,
        description: &str,
        legal_basis: &[&str],
    ) -> Self {
        Self {
            category,
            name: name.to_string(),
            description: description.to_string(),
            legal_basis: legal_basis.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub sla: SlaMatrix,
    pub escalation: EscalationPolicy,
    pub retrieval: RetrievalConfig,
    pub agents: AgentBudget,
    /// Category reference catalog, used to ground compliance prompts.
    pub categories: Vec<CategoryInfo>,
}

impl EngineConfig {
    /// Look up the reference metadata for a category.
    pub fn category_info(&self, category: ViolationCategory) -> Option<&CategoryInfo> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Check internal consistency. A malformed configuration indicates a
    /// deployment defect and aborts engine construction.
    pub fn validate(&self) -> CoreResult<()> {
        if self.escalation.level4_loss_threshold <= self.escalation.level3_loss_threshold {
            return Err(CoreError::config(
                "level 4 loss threshold must exceed level 3 threshold",
            ));
        }
        if self.retrieval.top_k == 0 || self.retrieval.top_k > self.retrieval.max_k {
            return Err(CoreError::config(format!(
                "retrieval top_k must be in 1..={}",
                self.retrieval.max_k
            )));
        }
        if self.agents.call_timeout_secs == 0 {
            return Err(CoreError::config("agent call timeout must be non-zero"));
        }
        // Response windows must tighten monotonically with severity.
        let hours = [
            self.sla.critical.initial_response_hours,
            self.sla.high.initial_response_hours,
            self.sla.medium.initial_response_hours,
            self.sla.low.initial_response_hours,
        ];
        if !hours.windows(2).all(|w| w[0] < w[1]) {
            return Err(CoreError::config(
                "SLA response windows must tighten as severity increases",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sla: SlaMatrix::default(),
            escalation: EscalationPolicy::default(),
            retrieval: RetrievalConfig::default(),
            agents: AgentBudget::default(),
            categories: default_categories(),
        }
    }
}

fn default_categories() -> Vec<CategoryInfo> {
    vec![
        CategoryInfo::new(
            ViolationCategory::Corruption,
            "Corruption",
            "Abuse of authority for personal or third-party gain",
            &["Anti-Corruption Act art. 2-3", "Anti-Corruption Act art. 5"],
        ),
        CategoryInfo::new(
            ViolationCategory::Gratification,
            "Gratification / Bribery",
            "Gifts or facilitation payments connected to an office",
            &["Anti-Corruption Act art. 12B"],
        ),
        CategoryInfo::new(
            ViolationCategory::Fraud,
            "Fraud",
            "Deceptive conduct causing financial or material loss",
            &["Criminal Code art. 378"],
        ),
        CategoryInfo::new(
            ViolationCategory::ConflictOfInterest,
            "Conflict of Interest",
            "Undisclosed personal interest in official decision-making",
            &["Public Administration Act", "Code of Ethics"],
        ),
        CategoryInfo::new(
            ViolationCategory::Procurement,
            "Procurement Violation",
            "Irregularities in tendering or goods/services procurement",
            &["Public Procurement Regulation art. 6-7"],
        ),
        CategoryInfo::new(
            ViolationCategory::DataBreach,
            "Data Breach",
            "Unlawful processing or disclosure of personal data",
            &["Data Protection Act art. 34"],
        ),
        CategoryInfo::new(
            ViolationCategory::Ethics,
            "Ethics Violation",
            "Breach of the organisational code of ethics",
            &["Code of Ethics"],
        ),
        CategoryInfo::new(
            ViolationCategory::Misconduct,
            "Misconduct",
            "Disciplinary violations of internal policy",
            &["Civil Service Discipline Regulation art. 3-5", "Internal SOP"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_sla_window_lookup() {
        let sla = SlaMatrix::default();
        assert_eq!(
            sla.window(SeverityLevel::Critical).unwrap().initial_response_hours,
            4
        );
        assert_eq!(
            sla.window(SeverityLevel::Low).unwrap().investigation_deadline_days,
            90
        );
        assert!(sla.window(SeverityLevel::Unknown).is_none());
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = EngineConfig::default();
        config.escalation.level4_loss_threshold = config.escalation.level3_loss_threshold;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_monotonic_sla() {
        let mut config = EngineConfig::default();
        config.sla.high.initial_response_hours = 2; // tighter than critical
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_top_k() {
        let mut config = EngineConfig::default();
        config.retrieval.top_k = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_escalation_party_lookup() {
        let policy = EscalationPolicy::default();
        assert_eq!(policy.party(EscalationLevel::Level4), "Supervisory Board");
        assert_eq!(policy.party(EscalationLevel::Level1), "Case Handling Unit");
    }

    #[test]
    fn test_category_catalog_lookup() {
        let config = EngineConfig::default();
        let info = config
            .category_info(ViolationCategory::Gratification)
            .unwrap();
        assert!(info.name.contains("Gratification"));
        assert!(!info.legal_basis.is_empty());
        assert!(config.category_info(ViolationCategory::Unknown).is_none());
    }
}
