//! Formatted terminal output.
//!
//! All report text is built as `String`s here so the pipeline stays free of
//! printing and the layout can be tested directly.

use crate::app::pipeline::RunOutput;
use crate::config::ExperimentConfig;
use crate::domain::{Keyword, ResultRecord};
use crate::scoring::{BiasScore, KeywordHit};
use crate::stats::{ExperimentStats, GroupSummary, PairedTTest, Verdict};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";
const MAX_HITS_SHOWN: usize = 3;

/// Study header: checklist items and the size of the grid.
pub fn format_header(config: &ExperimentConfig, backend: &str) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\nAI ETHICS CHECKLIST VALIDATION STUDY\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Backend: {backend}\n"));
    out.push_str(&format!("\nChecklist Items ({}):\n", config.criteria.len()));
    for c in &config.criteria {
        out.push_str(&format!("  - {}: {}\n", c.id, c.statement));
    }
    out.push_str(&format!("\nTest Scenarios: {}\n", config.scenarios.len()));
    out.push_str(&format!("Models: {}\n", config.models.len()));
    out.push_str(&format!(
        "Total Tests: {} (baseline + checklist)\n",
        config.total_generations()
    ));
    out
}

/// Full listing of the experiment tables (`checklist` subcommand).
pub fn format_checklist(config: &ExperimentConfig) -> String {
    let mut out = String::new();
    out.push_str("Checklist criteria:\n");
    for (i, c) in config.criteria.iter().enumerate() {
        out.push_str(&format!("{:>2}. [{}] {}\n", i + 1, c.id, c.statement));
        out.push_str(&format!("    Source: {}\n", c.source));
        if !c.indicators.is_empty() {
            out.push_str(&format!("    Indicators: {}\n", fmt_keywords(&c.indicators)));
        }
    }

    out.push_str("\nScenarios:\n");
    for s in &config.scenarios {
        out.push_str(&format!("- {} ({})\n", s.context, s.id));
        out.push_str(&format!("    {}\n", s.prompt));
        if s.dimensions.is_empty() {
            out.push_str("    Dimensions: all\n");
        } else {
            out.push_str(&format!("    Dimensions: {}\n", s.dimensions.join(", ")));
        }
    }

    out.push_str(&format!("\nModels: {}\n", config.models.join(", ")));

    if !config.bias_keywords.is_empty() {
        out.push_str(&format!(
            "\nGeneral bias keywords ({}): {}\n",
            config.bias_keywords.len(),
            fmt_keywords(&config.bias_keywords)
        ));
    }
    out.push_str(&format!(
        "\nHypothesis: reduction >= {:.0}% and p < {}\n",
        config.reduction_threshold * 100.0,
        config.significance_level
    ));
    out
}

fn fmt_keywords(keywords: &[Keyword]) -> String {
    keywords
        .iter()
        .map(|k| {
            if (k.weight - 1.0).abs() < f64::EPSILON {
                k.term.clone()
            } else {
                format!("{} (x{})", k.term, k.weight)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-pair detail blocks, grouped under a model heading.
pub fn format_pair_details(records: &[ResultRecord]) -> String {
    let mut out = String::new();
    let mut current_model: Option<&str> = None;

    for r in records {
        if current_model != Some(r.model.as_str()) {
            out.push_str(&format!("\n{RULE}\nModel: {}\n{RULE}\n", r.model));
            current_model = Some(r.model.as_str());
        }
        out.push_str(&format!("\n  Scenario: {} ({})\n", r.scenario_context, r.scenario_id));
        out.push_str(&format_arm("baseline", &r.baseline, &r.baseline_preview));
        out.push_str(&format_arm("checklist", &r.checklist, &r.checklist_preview));
        out.push_str(&format!("    Improvement: {:.1}%\n", r.improvement() * 100.0));
    }

    out
}

fn format_arm(label: &str, score: &BiasScore, preview: &str) -> String {
    let mut out = format!(
        "    {label:<9} score={:.3} matches={} words={}\n",
        score.value, score.matches, score.words
    );
    for (dimension, hits) in score.hits_by_dimension() {
        out.push_str(&format!("              {dimension}: {}\n", fmt_hits(&hits)));
    }
    if !preview.is_empty() {
        out.push_str(&format!("              {preview}\n"));
    }
    out
}

fn fmt_hits(hits: &[&KeywordHit]) -> String {
    let mut sorted: Vec<&KeywordHit> = hits.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    let mut parts: Vec<String> = sorted
        .iter()
        .take(MAX_HITS_SHOWN)
        .map(|h| format!("{} x{}", h.term, h.count))
        .collect();
    if hits.len() > MAX_HITS_SHOWN {
        parts.push(format!("+{} more", hits.len() - MAX_HITS_SHOWN));
    }
    parts.join(", ")
}

/// One row per (model, scenario).
pub fn format_results_table(records: &[ResultRecord]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<18} {:<20} {:>9} {:>9} {:>9} {:>9}\n",
            "model", "scenario", "baseline", "checklist", "density", "change"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<18} {:-<20} {:-<9} {:-<9} {:-<9} {:-<9}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in records {
        out.push_str(
            format!(
                "{:<18} {:<20} {:>9.3} {:>9.3} {:>9} {:>8.1}%\n",
                truncate(&r.model, 18),
                truncate(&r.scenario_id, 20),
                r.baseline_score(),
                r.checklist_score(),
                format!("{:.1}/{:.1}", r.baseline.density(), r.checklist.density()),
                r.improvement() * 100.0,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Per-model mean scores.
pub fn format_model_summary(groups: &[GroupSummary]) -> String {
    let mut out = String::new();
    out.push_str(THIN_RULE);
    out.push_str("\nPer-Model Results:\n");
    out.push_str(THIN_RULE);
    out.push('\n');
    for g in groups {
        out.push_str(&format!(
            "{:<18}: {:.3} -> {:.3} ({:+.1}%)\n",
            truncate(&g.label, 18),
            g.mean_baseline,
            g.mean_checklist,
            g.reduction * 100.0
        ));
    }
    out
}

/// Aggregate means, t-test and hypothesis verdict.
pub fn format_summary(stats: &ExperimentStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{RULE}\nRESULTS SUMMARY\n{RULE}\n"));
    out.push_str(&format!(
        "\nAverage Bias Score (Pre-Checklist):  {:.3}\n",
        stats.overall.mean_baseline
    ));
    out.push_str(&format!(
        "Average Bias Score (Post-Checklist): {:.3}\n",
        stats.overall.mean_checklist
    ));
    out.push_str(&format!("Bias Reduction: {:.2}%\n", stats.overall.reduction * 100.0));

    match &stats.t_test {
        Some(t) => out.push_str(&format_t_test(t)),
        None => out.push_str("\nPaired t-test: not computed\n"),
    }
    if let Some(diag) = &stats.diagnostic {
        out.push_str(&format!("  note: {diag}\n"));
    }

    out.push_str(&format_verdict(&stats.verdict));
    out
}

fn format_t_test(t: &PairedTTest) -> String {
    format!(
        "\nPaired t-test: t={:.3}, p={:.4} (n={}, df={}, mean diff={:.3}, sd={:.3})\n",
        t.t_statistic, t.p_value, t.n, t.df, t.mean_difference, t.sd_difference
    )
}

pub fn format_verdict(v: &Verdict) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{RULE}\nHYPOTHESIS EVALUATION\n{RULE}\n"));
    let threshold_pct = v.reduction_threshold * 100.0;
    let reduction_pct = v.reduction * 100.0;

    if v.confirmed {
        out.push_str("HYPOTHESIS CONFIRMED\n");
        out.push_str(&format!(
            "  - Bias reduction: {reduction_pct:.1}% (>={threshold_pct:.0}% threshold met)\n"
        ));
        if let Some(p) = v.p_value {
            out.push_str(&format!(
                "  - Statistical significance: p={p:.4} (p<{})\n",
                v.significance_level
            ));
        }
        return out;
    }

    out.push_str("HYPOTHESIS NOT CONFIRMED\n");
    if !v.reduction_met {
        out.push_str(&format!(
            "  - Bias reduction: {reduction_pct:.1}% (below {threshold_pct:.0}% threshold)\n"
        ));
    }
    match (v.p_value, v.significant) {
        (Some(p), Some(false)) => out.push_str(&format!(
            "  - Not statistically significant: p={p:.4} (p>={})\n",
            v.significance_level
        )),
        (None, _) => out.push_str("  - Significance could not be assessed\n"),
        _ => {}
    }
    out
}

/// Everything printed after a run, in order.
pub fn format_run(run: &RunOutput) -> String {
    let mut out = String::new();
    out.push_str(&format_pair_details(&run.records));
    out.push('\n');
    out.push_str(&format_results_table(&run.records));
    out.push_str(&format_summary(&run.stats));
    out.push('\n');
    out.push_str(&format_model_summary(&run.stats.per_model));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
