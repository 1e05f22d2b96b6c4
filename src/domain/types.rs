//! Shared domain types.
//!
//! Everything here lives for a single run: built from the configuration,
//! filled in while the experiment walks the (model, scenario) grid, then
//! handed to statistics and reporting.

use serde::{Deserialize, Serialize};

use crate::scoring::BiasScore;

/// A deployment context the models are asked to respond to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Stable identifier used in exports (`healthcare_kenya`).
    pub id: String,
    /// Short human label (`Healthcare - Low-income non-Western setting`).
    pub context: String,
    /// Task text sent to the model.
    pub prompt: String,
    /// Criterion ids whose indicators are scored for this scenario.
    /// Empty means every criterion applies.
    #[serde(default)]
    pub dimensions: Vec<String>,
}

impl Scenario {
    /// Whether indicators of criterion `id` count for this scenario.
    pub fn covers(&self, id: &str) -> bool {
        self.dimensions.is_empty() || self.dimensions.iter().any(|d| d == id)
    }
}

/// One ethical guideline rendered into the checklist-guided prompt.
///
/// The id doubles as the bias dimension its indicators are reported under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub statement: String,
    pub source: String,
    /// Bias-indicator keywords belonging to this dimension.
    #[serde(default)]
    pub indicators: Vec<Keyword>,
}

/// A bias-indicator term and its contribution per match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Keyword {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            weight: default_weight(),
        }
    }

    pub fn weighted(term: impl Into<String>, weight: f64) -> Self {
        Self {
            term: term.into(),
            weight,
        }
    }
}

/// Which prompt variant a completion was requested with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    Baseline,
    Checklist,
}

impl PromptMode {
    pub fn display_name(self) -> &'static str {
        match self {
            PromptMode::Baseline => "baseline",
            PromptMode::Checklist => "checklist",
        }
    }
}

/// The two completions produced for one (model, scenario) combination.
#[derive(Debug, Clone)]
pub struct ResponsePair {
    pub baseline: String,
    pub checklist: String,
}

impl ResponsePair {
    pub fn text(&self, mode: PromptMode) -> &str {
        match mode {
            PromptMode::Baseline => &self.baseline,
            PromptMode::Checklist => &self.checklist,
        }
    }
}

/// Scored outcome for one (model, scenario) pair.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub model: String,
    pub scenario_id: String,
    pub scenario_context: String,
    pub baseline: BiasScore,
    pub checklist: BiasScore,
    /// First characters of each response, kept for the terminal report.
    #[serde(skip)]
    pub baseline_preview: String,
    #[serde(skip)]
    pub checklist_preview: String,
}

/// Floor applied to the baseline when computing a per-pair improvement so a
/// zero baseline does not divide by zero.
const IMPROVEMENT_FLOOR: f64 = 0.01;

impl ResultRecord {
    pub fn baseline_score(&self) -> f64 {
        self.baseline.value
    }

    pub fn checklist_score(&self) -> f64 {
        self.checklist.value
    }

    /// Relative change for this pair: `(b - c) / max(b, 0.01)`.
    pub fn improvement(&self) -> f64 {
        let b = self.baseline_score();
        (b - self.checklist_score()) / b.max(IMPROVEMENT_FLOOR)
    }
}
