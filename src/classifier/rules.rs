//! Rule-based profile classifier driven by keyword lists

use crate::classifier::{Classifier, Prediction, UNKNOWN_PROFILE};
use crate::config::ProfileRule;
use crate::error::Result;
use crate::processing::keyword_matcher::KeywordMatcher;

/// Picks the profile whose keyword list matches the most keywords.
///
/// Ties go to the rule listed first; a text matching nothing gets the
/// fallback label.
pub struct RuleClassifier {
    rules: Vec<(String, KeywordMatcher)>,
    fallback_label: String,
}

impl RuleClassifier {
    pub fn new(rules: &[ProfileRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| Ok((rule.label.clone(), KeywordMatcher::from_raw(&rule.keywords)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            fallback_label: UNKNOWN_PROFILE.to_string(),
        })
    }

    pub fn with_fallback(mut self, label: &str) -> Self {
        self.fallback_label = label.to_string();
        self
    }
}

impl Classifier for RuleClassifier {
    fn predict(&self, text: &str) -> String {
        self.predict_scored(text).label
    }

    fn predict_scored(&self, text: &str) -> Prediction {
        let mut best: Option<(&str, u32, usize)> = None;

        for (label, matcher) in &self.rules {
            let score = matcher.score_text(text).score;
            if score > 0 && best.map_or(true, |(_, best_score, _)| score > best_score) {
                best = Some((label.as_str(), score, matcher.len()));
            }
        }

        match best {
            Some((label, score, total)) => Prediction {
                label: label.to_string(),
                confidence: Some(score as f64 / total.max(1) as f64),
            },
            None => Prediction {
                label: self.fallback_label.clone(),
                confidence: None,
            },
        }
    }

    fn labels(&self) -> Vec<String> {
        self.rules.iter().map(|(label, _)| label.clone()).collect()
    }

    fn name(&self) -> &str {
        "keyword-rules"
    }
}
