//! The experiment pipeline.
//!
//! preflight -> for each (model, scenario): baseline + checklist generation
//! -> scoring on the scenario's bias dimensions -> records -> statistics
//!
//! The pipeline is generic over [`TextGenerator`] so it runs the same against
//! the live service, the simulator, or a test fake. Presentation is left to
//! the caller.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::client::{TextGenerator, ensure_models_available};
use crate::config::ExperimentConfig;
use crate::domain::{PromptMode, ResponsePair, ResultRecord, Scenario};
use crate::error::AppError;
use crate::prompt::build_prompt;
use crate::scoring::BiasScorer;
use crate::stats::{ExperimentStats, analyze};

/// All computed outputs of a single run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub backend: String,
    pub started_at: DateTime<Local>,
    pub records: Vec<ResultRecord>,
    pub stats: ExperimentStats,
}

/// Execute the full experiment and return the computed outputs.
///
/// Any generation failure aborts the run; there are no retries.
pub fn run_experiment<G: TextGenerator + ?Sized>(
    generator: &mut G,
    config: &ExperimentConfig,
    preview_chars: usize,
) -> Result<RunOutput, AppError> {
    config.validate()?;
    let started_at = Local::now();
    let mut scorers = Vec::with_capacity(config.scenarios.len());
    for scenario in &config.scenarios {
        let scorer = BiasScorer::for_scenario(config, scenario)?;
        tracing::debug!(scenario = %scenario.id, keywords = scorer.keyword_count(), "scenario scorer ready");
        scorers.push(scorer);
    }

    // 1) Service reachable and every model pulled.
    ensure_models_available(&*generator, &config.models)?;
    tracing::info!(
        backend = generator.name(),
        models = config.models.len(),
        scenarios = config.scenarios.len(),
        generations = config.total_generations(),
        "starting experiment"
    );

    // 2) Strictly sequential sweep over the grid.
    let mut records = Vec::with_capacity(config.models.len() * config.scenarios.len());
    for model in &config.models {
        for (scenario, scorer) in config.scenarios.iter().zip(&scorers) {
            let pair = collect_pair(generator, config, model, scenario)?;
            let record = score_pair(scorer, model, scenario, &pair, preview_chars);
            tracing::info!(
                model = %model,
                scenario = %scenario.id,
                baseline = record.baseline_score(),
                checklist = record.checklist_score(),
                "scored pair"
            );
            records.push(record);
        }
    }

    // 3) Statistics.
    let stats = analyze(&records, config.reduction_threshold, config.significance_level);

    Ok(RunOutput {
        backend: generator.name().to_string(),
        started_at,
        records,
        stats,
    })
}

fn collect_pair<G: TextGenerator + ?Sized>(
    generator: &mut G,
    config: &ExperimentConfig,
    model: &str,
    scenario: &Scenario,
) -> Result<ResponsePair, AppError> {
    let baseline = generate_one(generator, config, model, scenario, PromptMode::Baseline)?;
    let checklist = generate_one(generator, config, model, scenario, PromptMode::Checklist)?;
    Ok(ResponsePair { baseline, checklist })
}

fn generate_one<G: TextGenerator + ?Sized>(
    generator: &mut G,
    config: &ExperimentConfig,
    model: &str,
    scenario: &Scenario,
    mode: PromptMode,
) -> Result<String, AppError> {
    let prompt = build_prompt(scenario, &config.criteria, mode);
    tracing::info!(model, scenario = %scenario.id, mode = mode.display_name(), "requesting completion");
    let text = generator.generate(model, &prompt)?;
    if text.trim().is_empty() {
        tracing::warn!(model, scenario = %scenario.id, mode = mode.display_name(), "empty response, scoring as 0");
    }
    Ok(text)
}

fn score_pair(
    scorer: &BiasScorer,
    model: &str,
    scenario: &Scenario,
    pair: &ResponsePair,
    preview_chars: usize,
) -> ResultRecord {
    ResultRecord {
        model: model.to_string(),
        scenario_id: scenario.id.clone(),
        scenario_context: scenario.context.clone(),
        baseline: scorer.score(pair.text(PromptMode::Baseline)),
        checklist: scorer.score(pair.text(PromptMode::Checklist)),
        baseline_preview: preview(&pair.baseline, preview_chars),
        checklist_preview: preview(&pair.checklist, preview_chars),
    }
}

/// First `max` characters on one line, with an ellipsis when cut.
fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let mut out: String = flat.chars().take(max).collect();
    out.push_str("...");
    out
}
