//! Paired statistics over baseline/checklist bias scores.
//!
//! - [`paired_t_test`]: Student's paired t-test, two-sided
//! - [`percent_reduction`]: relative drop of the mean score
//! - [`analyze`]: aggregate + per-model summaries and the hypothesis verdict

use serde::Serialize;
use thiserror::Error;

use crate::domain::ResultRecord;
use crate::math::student_t_two_sided_p;

/// Paired differences with a standard deviation at or below this are treated
/// as having zero variance.
const ZERO_VARIANCE_TOL: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("Paired t-test needs at least 2 pairs, got {n}.")]
    TooFewPairs { n: usize },
    #[error("Paired samples differ in length: {baseline} baseline vs {checklist} checklist scores.")]
    LengthMismatch { baseline: usize, checklist: usize },
    #[error("Scores must be finite.")]
    NonFinite,
}

/// Why a t-test result is not a regular finite statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    /// Every paired difference is zero: no evidence of any effect (t = 0, p = 1).
    AllDifferencesZero,
    /// Every paired difference is the same non-zero value (t = ±inf, p = 0).
    ConstantDifference,
}

impl Degeneracy {
    pub fn describe(self) -> &'static str {
        match self {
            Degeneracy::AllDifferencesZero => {
                "all paired differences are zero; t-statistic undefined, reported as t=0, p=1"
            }
            Degeneracy::ConstantDifference => {
                "paired differences have zero variance; t-statistic is infinite, reported as p=0"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedTTest {
    pub n: usize,
    pub df: usize,
    /// Mean of `baseline - checklist`.
    pub mean_difference: f64,
    /// Sample standard deviation (n - 1) of the differences.
    pub sd_difference: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub degeneracy: Option<Degeneracy>,
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Fractional reduction `(b - c) / b`; 0 when the baseline mean is not positive.
pub fn percent_reduction(mean_baseline: f64, mean_checklist: f64) -> f64 {
    if mean_baseline > 0.0 {
        (mean_baseline - mean_checklist) / mean_baseline
    } else {
        0.0
    }
}

/// Two-sided paired t-test of `baseline` against `checklist`.
pub fn paired_t_test(baseline: &[f64], checklist: &[f64]) -> Result<PairedTTest, StatsError> {
    if baseline.len() != checklist.len() {
        return Err(StatsError::LengthMismatch {
            baseline: baseline.len(),
            checklist: checklist.len(),
        });
    }
    let n = baseline.len();
    if n < 2 {
        return Err(StatsError::TooFewPairs { n });
    }
    if baseline.iter().chain(checklist).any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }

    let diffs: Vec<f64> = baseline.iter().zip(checklist).map(|(b, c)| b - c).collect();
    let mean_difference = mean(&diffs);
    let variance = diffs.iter().map(|d| (d - mean_difference).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    let sd_difference = variance.sqrt();
    let df = n - 1;

    if sd_difference <= ZERO_VARIANCE_TOL {
        let (t_statistic, p_value, degeneracy) = if mean_difference == 0.0 {
            (0.0, 1.0, Degeneracy::AllDifferencesZero)
        } else {
            let t = if mean_difference > 0.0 { f64::INFINITY } else { f64::NEG_INFINITY };
            (t, 0.0, Degeneracy::ConstantDifference)
        };
        tracing::warn!(n, mean_difference, "degenerate paired sample: {}", degeneracy.describe());
        return Ok(PairedTTest {
            n,
            df,
            mean_difference,
            sd_difference,
            t_statistic,
            p_value,
            degeneracy: Some(degeneracy),
        });
    }

    let t_statistic = mean_difference / (sd_difference / (n as f64).sqrt());
    let p_value = student_t_two_sided_p(t_statistic, df as f64);

    Ok(PairedTTest {
        n,
        df,
        mean_difference,
        sd_difference,
        t_statistic,
        p_value,
        degeneracy: None,
    })
}

/// Mean scores for one group of records (a model, or the whole run).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub n: usize,
    pub mean_baseline: f64,
    pub mean_checklist: f64,
    /// Fraction, not percent.
    pub reduction: f64,
}

impl GroupSummary {
    fn from_scores(label: impl Into<String>, baseline: &[f64], checklist: &[f64]) -> Self {
        let mean_baseline = mean(baseline);
        let mean_checklist = mean(checklist);
        Self {
            label: label.into(),
            n: baseline.len(),
            mean_baseline,
            mean_checklist,
            reduction: percent_reduction(mean_baseline, mean_checklist),
        }
    }
}

/// Hypothesis decision: reduction at or above the threshold and p below alpha.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub confirmed: bool,
    pub reduction: f64,
    pub reduction_threshold: f64,
    pub reduction_met: bool,
    /// `None` when no p-value could be computed.
    pub p_value: Option<f64>,
    pub significance_level: f64,
    pub significant: Option<bool>,
}

impl Verdict {
    pub fn decide(
        reduction: f64,
        p_value: Option<f64>,
        reduction_threshold: f64,
        significance_level: f64,
    ) -> Self {
        let reduction_met = reduction >= reduction_threshold;
        let significant = p_value.map(|p| p < significance_level);
        Self {
            confirmed: reduction_met && significant == Some(true),
            reduction,
            reduction_threshold,
            reduction_met,
            p_value,
            significance_level,
            significant,
        }
    }
}

/// Everything the report needs from the statistics layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentStats {
    pub overall: GroupSummary,
    pub per_model: Vec<GroupSummary>,
    pub t_test: Option<PairedTTest>,
    /// Set when the t-test could not be run.
    pub diagnostic: Option<String>,
    pub verdict: Verdict,
}

/// Aggregate the collected records.
///
/// Per-model summaries follow the order models first appear in `records`.
pub fn analyze(records: &[ResultRecord], reduction_threshold: f64, significance_level: f64) -> ExperimentStats {
    let baseline: Vec<f64> = records.iter().map(|r| r.baseline_score()).collect();
    let checklist: Vec<f64> = records.iter().map(|r| r.checklist_score()).collect();
    let overall = GroupSummary::from_scores("all", &baseline, &checklist);

    let mut models: Vec<&str> = Vec::new();
    for r in records {
        if !models.contains(&r.model.as_str()) {
            models.push(&r.model);
        }
    }
    let per_model = models
        .iter()
        .map(|model| {
            let (b, c): (Vec<f64>, Vec<f64>) = records
                .iter()
                .filter(|r| r.model == *model)
                .map(|r| (r.baseline_score(), r.checklist_score()))
                .unzip();
            GroupSummary::from_scores(*model, &b, &c)
        })
        .collect();

    let (t_test, diagnostic) = match paired_t_test(&baseline, &checklist) {
        Ok(t) => {
            let diagnostic = t.degeneracy.map(|d| d.describe().to_string());
            (Some(t), diagnostic)
        }
        Err(err) => {
            tracing::warn!(error = %err, "paired t-test not computed");
            (None, Some(err.to_string()))
        }
    };

    let verdict = Verdict::decide(
        overall.reduction,
        t_test.as_ref().map(|t| t.p_value),
        reduction_threshold,
        significance_level,
    );

    ExperimentStats {
        overall,
        per_model,
        t_test,
        diagnostic,
        verdict,
    }
}
