//! Offline stand-in for the model service.
//!
//! Produces filler text with a Poisson-distributed number of bias keywords.
//! Prompts that carry the checklist draw from a lower rate, so a simulated run
//! exercises the full pipeline and shows a reduction without any service.
//!
//! Output is a pure function of `(seed, model, prompt)`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Poisson;

use super::{ServiceError, TextGenerator};
use crate::domain::Keyword;
use crate::prompt::CHECKLIST_MARKER;

/// Mean keyword count for plain prompts.
pub const DEFAULT_BASELINE_RATE: f64 = 4.0;
/// Mean keyword count for checklist-guided prompts.
pub const DEFAULT_CHECKLIST_RATE: f64 = 1.5;

const FILLER_WORDS: usize = 110;
const FILLER: [&str; 24] = [
    "the", "approach", "should", "local", "team", "plan", "with", "clear", "steps", "and",
    "support", "for", "people", "in", "context", "using", "available", "tools", "to", "improve",
    "outcomes", "over", "time", "carefully",
];

pub struct SimulatedGenerator {
    seed: u64,
    models: Vec<String>,
    keywords: Vec<String>,
    baseline_rate: f64,
    checklist_rate: f64,
}

impl SimulatedGenerator {
    pub fn new(seed: u64, models: &[String], keywords: &[Keyword]) -> Self {
        Self {
            seed,
            models: models.to_vec(),
            keywords: keywords.iter().map(|k| k.term.clone()).collect(),
            baseline_rate: DEFAULT_BASELINE_RATE,
            checklist_rate: DEFAULT_CHECKLIST_RATE,
        }
    }

    pub fn with_rates(mut self, baseline_rate: f64, checklist_rate: f64) -> Self {
        self.baseline_rate = baseline_rate;
        self.checklist_rate = checklist_rate;
        self
    }

    fn call_seed(&self, model: &str, prompt: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        model.hash(&mut hasher);
        prompt.hash(&mut hasher);
        hasher.finish()
    }
}

impl TextGenerator for SimulatedGenerator {
    fn name(&self) -> &str {
        "simulated"
    }

    fn available_models(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.models.clone())
    }

    fn generate(&mut self, model: &str, prompt: &str) -> Result<String, ServiceError> {
        if !self.models.iter().any(|m| m == model) {
            return Err(ServiceError::ModelNotFound {
                model: model.to_string(),
            });
        }

        let rate = if prompt.contains(CHECKLIST_MARKER) {
            self.checklist_rate
        } else {
            self.baseline_rate
        };

        let mut rng = StdRng::seed_from_u64(self.call_seed(model, prompt));
        let n_keywords = if rate > 0.0 && !self.keywords.is_empty() {
            let poisson = Poisson::new(rate)
                .map_err(|e| ServiceError::InvalidResponse(format!("Invalid simulation rate {rate}: {e}")))?;
            poisson.sample(&mut rng) as usize
        } else {
            0
        };

        let mut words: Vec<String> = (0..FILLER_WORDS)
            .map(|_| FILLER[rng.gen_range(0..FILLER.len())].to_string())
            .collect();
        for _ in 0..n_keywords {
            let kw = &self.keywords[rng.gen_range(0..self.keywords.len())];
            let at = rng.gen_range(0..=words.len());
            // Trailing comma keeps neighbouring keywords from fusing into a longer phrase.
            words.insert(at, format!("{kw},"));
        }

        Ok(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExperimentConfig;
    use crate::scoring::BiasScorer;

    fn default_keywords() -> Vec<crate::domain::Keyword> {
        ExperimentConfig::default().all_keywords()
    }

    fn generator(seed: u64) -> SimulatedGenerator {
        SimulatedGenerator::new(seed, &["sim:1b".to_string()], &default_keywords())
    }

    #[test]
    fn output_is_deterministic_per_seed() {
        let a = generator(7).generate("sim:1b", "prompt").unwrap();
        let b = generator(7).generate("sim:1b", "prompt").unwrap();
        let c = generator(8).generate("sim:1b", "prompt").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unknown_model_fails() {
        let err = generator(1).generate("other", "prompt").unwrap_err();
        assert_eq!(err, ServiceError::ModelNotFound { model: "other".to_string() });
    }

    #[test]
    fn filler_contains_no_keywords() {
        let mut g = generator(3).with_rates(0.0, 0.0);
        let text = g.generate("sim:1b", "prompt").unwrap();
        let scorer = BiasScorer::new(&default_keywords()).unwrap();
        assert_eq!(scorer.score(&text).matches, 0);
        assert_eq!(text.split_whitespace().count(), FILLER_WORDS);
    }

    #[test]
    fn checklist_prompts_draw_fewer_keywords() {
        let mut g = generator(42);
        let scorer = BiasScorer::new(&default_keywords()).unwrap();
        let mut baseline = 0;
        let mut checklist = 0;
        for i in 0..200 {
            let task = format!("task {i}");
            let guided = format!("{CHECKLIST_MARKER}\n{task}");
            baseline += scorer.score(&g.generate("sim:1b", &task).unwrap()).matches;
            checklist += scorer.score(&g.generate("sim:1b", &guided).unwrap()).matches;
        }
        assert!(checklist < baseline, "checklist={checklist} baseline={baseline}");
    }
}
