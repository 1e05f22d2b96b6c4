//! Keyword-based bias scoring.
//!
//! A response's bias score is the weighted number of bias-indicator keyword
//! matches in its text. Matching rules:
//!
//! - case-insensitive;
//! - whole words only: a keyword must not be preceded or followed by a word
//!   character, so `bias` does not match inside `biased` and `age` does not
//!   match inside `language`;
//! - multi-word keywords match across any run of whitespace (`black  box`);
//! - leftmost-longest, non-overlapping: where several keywords start at the
//!   same position the longest one wins, and scanning resumes after it.
//!
//! Every match contributes its keyword's weight (non-negative), so the score
//! is never negative and never drops when another separate occurrence of a
//! keyword is added.
//!
//! A scenario is scored against the indicators of the bias dimensions it
//! covers plus the general keywords; hits remember the dimension they came
//! from so the report can group them.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::config::ExperimentConfig;
use crate::domain::{Keyword, Scenario};
use crate::error::AppError;

/// Label used for hits on keywords outside any dimension.
pub const GENERAL_DIMENSION: &str = "general";

/// Number of matches for one keyword in a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordHit {
    pub term: String,
    pub count: usize,
    /// Criterion id the keyword is an indicator for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
}

/// Scoring outcome for one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasScore {
    /// Weighted match count. This is the number fed to the statistics.
    pub value: f64,
    /// Unweighted number of matches.
    pub matches: usize,
    /// Whitespace-separated word count of the response.
    pub words: usize,
    /// Per-keyword counts, in order of first appearance in the text.
    pub hits: Vec<KeywordHit>,
}

impl BiasScore {
    pub fn zero() -> Self {
        Self {
            value: 0.0,
            matches: 0,
            words: 0,
            hits: Vec::new(),
        }
    }

    /// Matches per 100 words (0 for an empty response).
    pub fn density(&self) -> f64 {
        if self.words == 0 {
            0.0
        } else {
            self.matches as f64 * 100.0 / self.words as f64
        }
    }

    /// Hits grouped by dimension, in order of first appearance.
    pub fn hits_by_dimension(&self) -> Vec<(&str, Vec<&KeywordHit>)> {
        let mut groups: Vec<(&str, Vec<&KeywordHit>)> = Vec::new();
        for hit in &self.hits {
            let label = hit.dimension.as_deref().unwrap_or(GENERAL_DIMENSION);
            match groups.iter_mut().find(|(l, _)| *l == label) {
                Some((_, hits)) => hits.push(hit),
                None => groups.push((label, vec![hit])),
            }
        }
        groups
    }

    #[cfg(test)]
    pub(crate) fn from_value(value: f64) -> Self {
        Self {
            value,
            ..Self::zero()
        }
    }
}

#[derive(Debug, Clone)]
struct ScoredTerm {
    term: String,
    weight: f64,
    dimension: Option<String>,
}

/// Compiled keyword matcher.
#[derive(Debug, Clone)]
pub struct BiasScorer {
    regex: Regex,
    /// Terms in pattern order; capture group `i + 1` belongs to `keywords[i]`.
    keywords: Vec<ScoredTerm>,
}

impl BiasScorer {
    /// Compile a scorer for `keywords`, outside any dimension.
    pub fn new(keywords: &[Keyword]) -> Result<Self, AppError> {
        Self::from_scoped(keywords.iter().map(|k| (None, k)))
    }

    /// Compile the scorer for one scenario: indicators of the dimensions it
    /// covers plus the general keywords.
    pub fn for_scenario(config: &ExperimentConfig, scenario: &Scenario) -> Result<Self, AppError> {
        Self::from_scoped(config.keywords_for(scenario))
    }

    /// Duplicate terms (compared case-insensitively) keep the first weight
    /// and dimension.
    fn from_scoped<'a>(keywords: impl IntoIterator<Item = (Option<&'a str>, &'a Keyword)>) -> Result<Self, AppError> {
        let mut ordered: Vec<ScoredTerm> = Vec::new();
        for (dimension, kw) in keywords {
            let term = normalize_term(&kw.term);
            if term.is_empty() {
                return Err(AppError::config("Bias keywords must not be empty."));
            }
            if ordered.iter().any(|k| k.term == term) {
                continue;
            }
            ordered.push(ScoredTerm {
                term,
                weight: kw.weight,
                dimension: dimension.map(str::to_string),
            });
        }
        if ordered.is_empty() {
            return Err(AppError::config("At least one bias keyword is required."));
        }

        // Longest first so the alternation is leftmost-longest at any start.
        ordered.sort_by(|a, b| b.term.len().cmp(&a.term.len()).then_with(|| a.term.cmp(&b.term)));

        let alternation = ordered
            .iter()
            .map(|k| format!("({})", term_pattern(&k.term)))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"\b{{start-half}}(?:{alternation})\b{{end-half}}");

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::config(format!("Failed to compile bias keyword matcher: {e}")))?;

        tracing::debug!(keywords = ordered.len(), "compiled bias keyword matcher");

        Ok(Self {
            regex,
            keywords: ordered,
        })
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Score a response. Empty or whitespace-only text scores zero.
    pub fn score(&self, text: &str) -> BiasScore {
        let words = text.split_whitespace().count();
        if words == 0 {
            return BiasScore::zero();
        }

        let mut hits: Vec<KeywordHit> = Vec::new();
        let mut value = 0.0;
        let mut matches = 0;

        for caps in self.regex.captures_iter(text) {
            let Some(idx) = (1..caps.len()).find(|&i| caps.get(i).is_some()) else {
                continue;
            };
            let kw = &self.keywords[idx - 1];
            value += kw.weight;
            matches += 1;
            match hits.iter_mut().find(|h| h.term == kw.term) {
                Some(hit) => hit.count += 1,
                None => hits.push(KeywordHit {
                    term: kw.term.clone(),
                    count: 1,
                    dimension: kw.dimension.clone(),
                }),
            }
        }

        BiasScore {
            value,
            matches,
            words,
            hits,
        }
    }
}

fn normalize_term(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn term_pattern(term: &str) -> String {
    term.split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn default_keywords() -> Vec<Keyword> {
        ExperimentConfig::default().all_keywords()
    }

    fn hit(term: &str, count: usize) -> KeywordHit {
        KeywordHit {
            term: term.to_string(),
            count,
            dimension: None,
        }
    }

    fn scorer(terms: &[&str]) -> BiasScorer {
        let kws: Vec<Keyword> = terms.iter().map(|t| Keyword::new(*t)).collect();
        BiasScorer::new(&kws).unwrap()
    }

    #[test]
    fn empty_text_scores_zero() {
        let s = scorer(&["bias"]);
        assert_eq!(s.score(""), BiasScore::zero());
        assert_eq!(s.score("   \n\t").value, 0.0);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let s = scorer(&["bias"]);
        assert_eq!(s.score("BIAS").value, s.score("bias").value);
        assert_eq!(s.score("Bias").value, 1.0);
    }

    #[test]
    fn whole_words_only() {
        let s = scorer(&["bias", "age"]);
        assert_eq!(s.score("a biased take on language").value, 0.0);
        assert_eq!(s.score("bias, age; (bias)").value, 3.0);
    }

    #[test]
    fn listed_inflections_count_separately() {
        let s = scorer(&["bias", "biased"]);
        let score = s.score("bias and biased");
        assert_eq!(score.matches, 2);
        assert_eq!(
            score.hits,
            vec![hit("bias", 1), hit("biased", 1)]
        );
    }

    #[test]
    fn longest_keyword_wins_without_double_counting() {
        let s = scorer(&["black", "black box", "box"]);
        let score = s.score("It is a black box.");
        assert_eq!(score.matches, 1);
        assert_eq!(score.hits[0].term, "black box");

        // Falls back to the shorter keyword when the longer one is not whole.
        let score = s.score("black boxes");
        assert_eq!(score.matches, 1);
        assert_eq!(score.hits[0].term, "black");
    }

    #[test]
    fn multi_word_keywords_span_whitespace_runs() {
        let s = scorer(&["side effect"]);
        assert_eq!(s.score("a SIDE\n  effect here").value, 1.0);
        assert_eq!(s.score("side-effect").value, 0.0);
    }

    #[test]
    fn hyphenated_keywords_match() {
        let s = scorer(&["low-income"]);
        assert_eq!(s.score("Low-income families").value, 1.0);
    }

    #[test]
    fn weights_are_summed() {
        let kws = vec![Keyword::weighted("elite", 2.0), Keyword::weighted("unfair", 0.5)];
        let s = BiasScorer::new(&kws).unwrap();
        assert!((s.score("elite, elite and unfair").value - 4.5).abs() < 1e-12);
    }

    #[test]
    fn duplicate_terms_keep_first_weight() {
        let kws = vec![Keyword::weighted("Elite", 2.0), Keyword::weighted("elite", 7.0)];
        let s = BiasScorer::new(&kws).unwrap();
        assert_eq!(s.keyword_count(), 1);
        assert_eq!(s.score("elite").value, 2.0);
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let s = scorer(&["c++", "a.b"]);
        assert_eq!(s.score("axb").value, 0.0);
        assert_eq!(s.score("a.b").value, 1.0);
        assert_eq!(s.score("uses c++ daily").value, 1.0);
    }

    #[test]
    fn density_is_per_hundred_words() {
        let s = scorer(&["risk"]);
        let score = s.score("risk one two three");
        assert_eq!(score.words, 4);
        assert!((score.density() - 25.0).abs() < 1e-12);
        assert_eq!(BiasScore::zero().density(), 0.0);
    }

    #[test]
    fn empty_keyword_is_rejected() {
        assert!(BiasScorer::new(&[Keyword::new("  ")]).is_err());
        assert!(BiasScorer::new(&[]).is_err());
    }

    #[test]
    fn keywords_outside_scenario_dimensions_do_not_count() {
        let config = ExperimentConfig::default();
        // Hiring covers organizational_bias and cultural_inclusivity only.
        let hiring = &config.scenarios[1];
        let s = BiasScorer::for_scenario(&config, hiring).unwrap();

        assert_eq!(s.score("A carbon heavy, opaque plan.").value, 0.0);
        let score = s.score("An unfair, Western-only shortlist.");
        assert_eq!(score.matches, 2);
        assert_eq!(score.hits[0].dimension.as_deref(), Some("organizational_bias"));
        assert_eq!(score.hits[1].dimension.as_deref(), Some("cultural_inclusivity"));
    }

    #[test]
    fn scenario_without_dimensions_uses_every_indicator() {
        let mut config = ExperimentConfig::default();
        config.scenarios[1].dimensions.clear();
        let s = BiasScorer::for_scenario(&config, &config.scenarios[1]).unwrap();
        assert_eq!(s.keyword_count(), 33);
        assert_eq!(s.score("carbon and opaque").matches, 2);
    }

    #[test]
    fn hits_group_by_dimension_in_order_of_appearance() {
        let mut config = ExperimentConfig::default();
        config.bias_keywords.push(Keyword::new("biased"));
        let s = BiasScorer::for_scenario(&config, &config.scenarios[0]).unwrap();
        let score = s.score("elite care, a biased triage, gender gaps, privileged access");

        let groups: Vec<(&str, Vec<&str>)> = score
            .hits_by_dimension()
            .into_iter()
            .map(|(d, hits)| (d, hits.iter().map(|h| h.term.as_str()).collect()))
            .collect();
        assert_eq!(
            groups,
            vec![
                ("service_equity", vec!["elite", "privileged"]),
                (GENERAL_DIMENSION, vec!["biased"]),
                ("healthcare_privacy", vec!["gender"]),
            ]
        );
    }

    proptest! {
        #[test]
        fn score_is_never_negative(text in ".{0,300}") {
            let s = BiasScorer::new(&default_keywords()).unwrap();
            prop_assert!(s.score(&text).value >= 0.0);
        }

        #[test]
        fn score_is_idempotent(text in ".{0,300}") {
            let s = BiasScorer::new(&default_keywords()).unwrap();
            prop_assert_eq!(s.score(&text), s.score(&text));
        }

        #[test]
        fn adding_a_keyword_never_decreases_score(
            text in "[a-zA-Z ,.-]{0,200}",
            idx in 0usize..33,
        ) {
            let keywords = default_keywords();
            let s = BiasScorer::new(&keywords).unwrap();
            let before = s.score(&text).value;
            let extended = format!("{text}. {}", keywords[idx % keywords.len()].term);
            prop_assert!(s.score(&extended).value >= before + 1.0);
        }

        #[test]
        fn scenario_scores_never_decrease_with_an_in_scope_keyword(
            text in "[a-zA-Z ,.-]{0,200}",
            scenario in 0usize..5,
            idx in 0usize..64,
        ) {
            let config = ExperimentConfig::default();
            let scenario = &config.scenarios[scenario];
            let s = BiasScorer::for_scenario(&config, scenario).unwrap();
            let scoped = config.keywords_for(scenario);
            let term = &scoped[idx % scoped.len()].1.term;

            let before = s.score(&text).value;
            prop_assert!(before >= 0.0);
            let appended = format!("{text}. {term}");
            prop_assert!(s.score(&appended).value >= before + 1.0);
        }

        #[test]
        fn ascii_case_does_not_matter(text in "[a-zA-Z ,.-]{0,200}") {
            let s = BiasScorer::new(&default_keywords()).unwrap();
            prop_assert_eq!(s.score(&text.to_uppercase()).value, s.score(&text.to_lowercase()).value);
        }
    }
}
