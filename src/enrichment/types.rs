//! Core types for AI enrichment batches.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::EnrichmentError;

// ═══════════════════════════════════════════
// Module Key
// ═══════════════════════════════════════════

/// Every enrichment module the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKey {
    PhotoCaptions,
    DamageNarrative,
    StormCorrelation,
    ScopeReview,
}

impl ModuleKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhotoCaptions => "photo_captions",
            Self::DamageNarrative => "damage_narrative",
            Self::StormCorrelation => "storm_correlation",
            Self::ScopeReview => "scope_review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "photo_captions" => Some(Self::PhotoCaptions),
            "damage_narrative" => Some(Self::DamageNarrative),
            "storm_correlation" => Some(Self::StormCorrelation),
            "scope_review" => Some(Self::ScopeReview),
            _ => None,
        }
    }

    pub fn all() -> &'static [ModuleKey] {
        &[
            Self::PhotoCaptions,
            Self::DamageNarrative,
            Self::StormCorrelation,
            Self::ScopeReview,
        ]
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credit units charged for one successful module run.
pub type CostUnits = u64;

// ═══════════════════════════════════════════
// Outcomes
// ═══════════════════════════════════════════

/// Result of one triggered module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModuleOutcome {
    /// Module produced usable output and is billed `cost`.
    Completed {
        output: serde_json::Value,
        cost: CostUnits,
    },
    /// Module produced nothing usable and is not billed.
    Failed { error: String },
}

impl ModuleOutcome {
    pub fn failed(error: &EnrichmentError) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn output(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Completed { output, .. } => Some(output),
            Self::Failed { .. } => None,
        }
    }
}

/// Everything one enrichment batch produced. Built once per composition
/// request and handed to the renderer and billing meter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentBatchResult {
    /// One entry per module whose trigger fired (or failed).
    pub results: BTreeMap<ModuleKey, ModuleOutcome>,
    /// Modules whose trigger returned false. Never invoked, never billed.
    pub skipped: Vec<ModuleKey>,
    /// Sum of `cost` over completed modules.
    pub total_cost: CostUnits,
    pub duration_ms: u64,
    /// True when the batch was cut short by the caller.
    pub cancelled: bool,
}

impl EnrichmentBatchResult {
    pub fn completed_count(&self) -> usize {
        self.results.values().filter(|o| o.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.completed_count()
    }

    /// Caller-facing notice when some enrichments did not make it into the
    /// report, `None` when all triggered modules completed.
    pub fn unavailable_notice(&self) -> Option<String> {
        match self.failed_count() {
            0 => None,
            1 => Some("Report generated with 1 enrichment unavailable".to_string()),
            n => Some(format!("Report generated with {n} enrichments unavailable")),
        }
    }

    /// Recompute `total_cost` from completed outcomes.
    pub(crate) fn recompute_cost(&mut self) {
        self.total_cost = self
            .results
            .values()
            .map(|o| match o {
                ModuleOutcome::Completed { cost, .. } => *cost,
                ModuleOutcome::Failed { .. } => 0,
            })
            .sum();
    }
}
