//! Experiment configuration.
//!
//! The experiment is defined by a handful of fixed tables (models, scenarios,
//! checklist criteria, bias keywords) plus two decision thresholds. They live
//! in one [`ExperimentConfig`] so tests can swap in small fixtures, and the
//! binary can load a TOML file with the same shape:
//!
//! ```toml
//! models = ["gemma3:1b"]
//! reduction_threshold = 0.25
//!
//! [[criteria]]
//! id = "organizational_bias"
//! statement = "Does the decision address known organizational biases?"
//! source = "Stahl et al. (2022)"
//! indicators = [{ term = "unfair" }, { term = "elite", weight = 2.0 }]
//!
//! [[scenarios]]
//! id = "hiring"
//! context = "Hiring"
//! prompt = "Rank these candidates..."
//! dimensions = ["organizational_bias"]
//!
//! [[bias_keywords]]
//! term = "stereotype"
//! ```
//!
//! Each criterion carries the indicators of its bias dimension, and a
//! scenario is scored only on the dimensions it lists (all of them when it
//! lists none). `bias_keywords` apply to every scenario. Fields missing from
//! the file keep their built-in values.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Criterion, Keyword, Scenario};
use crate::error::AppError;

pub mod defaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub models: Vec<String>,
    pub scenarios: Vec<Scenario>,
    pub criteria: Vec<Criterion>,
    /// Keywords scored for every scenario, outside any dimension.
    pub bias_keywords: Vec<Keyword>,
    /// Minimum fractional bias reduction for the hypothesis to hold.
    pub reduction_threshold: f64,
    /// Two-sided p-value cutoff for the paired t-test.
    pub significance_level: f64,
    /// Sampling temperature forwarded to the model service, if set.
    pub temperature: Option<f64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            models: defaults::default_models(),
            scenarios: defaults::default_scenarios(),
            criteria: defaults::default_criteria(),
            bias_keywords: Vec::new(),
            reduction_threshold: defaults::DEFAULT_REDUCTION_THRESHOLD,
            significance_level: defaults::DEFAULT_SIGNIFICANCE_LEVEL,
            temperature: None,
        }
    }
}

impl ExperimentConfig {
    /// Load a TOML config file and validate it.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::io(format!("Failed to read config '{}': {e}", path.display())))?;
        let config: ExperimentConfig = toml::from_str(&raw)
            .map_err(|e| AppError::config(format!("Invalid config '{}': {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in tables, or the file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }

    /// Total number of generations a full run performs (baseline + checklist).
    pub fn total_generations(&self) -> usize {
        self.models.len() * self.scenarios.len() * 2
    }

    /// Keywords scored for `scenario`, tagged with the dimension they belong
    /// to: indicators of the covered criteria in criteria order, then the
    /// general keywords.
    pub fn keywords_for<'a>(&'a self, scenario: &Scenario) -> Vec<(Option<&'a str>, &'a Keyword)> {
        let mut out = Vec::new();
        for c in self.criteria.iter().filter(|c| scenario.covers(&c.id)) {
            out.extend(c.indicators.iter().map(|k| (Some(c.id.as_str()), k)));
        }
        out.extend(self.bias_keywords.iter().map(|k| (None, k)));
        out
    }

    /// Every configured keyword, dimension indicators first.
    pub fn all_keywords(&self) -> Vec<Keyword> {
        self.criteria
            .iter()
            .flat_map(|c| c.indicators.iter())
            .chain(&self.bias_keywords)
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.models.is_empty() {
            return Err(AppError::config("At least one model is required."));
        }
        if self.scenarios.is_empty() {
            return Err(AppError::config("At least one scenario is required."));
        }

        let mut seen = HashSet::new();
        for model in &self.models {
            if model.trim().is_empty() {
                return Err(AppError::config("Model identifiers must not be empty."));
            }
            if !seen.insert(model.as_str()) {
                return Err(AppError::config(format!("Duplicate model '{model}'.")));
            }
        }

        let mut criterion_ids = HashSet::new();
        for c in &self.criteria {
            if !criterion_ids.insert(c.id.as_str()) {
                return Err(AppError::config(format!("Duplicate criterion id '{}'.", c.id)));
            }
        }

        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.id.as_str()) {
                return Err(AppError::config(format!("Duplicate scenario id '{}'.", scenario.id)));
            }
            if scenario.prompt.trim().is_empty() {
                return Err(AppError::config(format!("Scenario '{}' has an empty prompt.", scenario.id)));
            }
            if let Some(unknown) = scenario
                .dimensions
                .iter()
                .find(|d| !criterion_ids.contains(d.as_str()))
            {
                return Err(AppError::config(format!(
                    "Scenario '{}' names unknown dimension '{unknown}'.",
                    scenario.id
                )));
            }
            if self.keywords_for(scenario).is_empty() {
                return Err(AppError::config(format!(
                    "Scenario '{}' has no bias keywords to score.",
                    scenario.id
                )));
            }
        }

        for kw in self.all_keywords() {
            if kw.term.trim().is_empty() {
                return Err(AppError::config("Bias keywords must not be empty."));
            }
            if !(kw.weight.is_finite() && kw.weight >= 0.0) {
                return Err(AppError::config(format!(
                    "Keyword '{}' has invalid weight {} (must be finite and >= 0).",
                    kw.term, kw.weight
                )));
            }
        }

        if !(self.reduction_threshold > 0.0 && self.reduction_threshold < 1.0) {
            return Err(AppError::config("reduction_threshold must be in (0, 1)."));
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(AppError::config("significance_level must be in (0, 1)."));
        }
        if let Some(t) = self.temperature {
            if !(t.is_finite() && t >= 0.0) {
                return Err(AppError::config("temperature must be finite and >= 0."));
            }
        }

        Ok(())
    }
}
