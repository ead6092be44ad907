//! Technical-profile classification

pub mod logistic;
pub mod model;
pub mod rules;
pub mod tfidf;
pub mod training;

use crate::processing::document::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use model::ProfileModel;
pub use rules::RuleClassifier;

/// Label used when no profile can be assigned.
pub const UNKNOWN_PROFILE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Probability of `label`, when the backend produces one
    pub confidence: Option<f64>,
}

/// Predicts a profile label for a normalized document text.
///
/// Implementations always return their best match; turning weak predictions
/// into an unknown label is the job of [`ProfilePredictor`].
pub trait Classifier {
    fn predict(&self, text: &str) -> String;

    fn predict_scored(&self, text: &str) -> Prediction {
        Prediction {
            label: self.predict(text),
            confidence: None,
        }
    }

    fn labels(&self) -> Vec<String>;

    fn name(&self) -> &str;
}

/// Applies a classifier to a batch of documents, with an optional confidence gate
pub struct ProfilePredictor<'a> {
    classifier: &'a dyn Classifier,
    min_confidence: Option<f64>,
    fallback_label: String,
}

impl<'a> ProfilePredictor<'a> {
    pub fn new(classifier: &'a dyn Classifier) -> Self {
        Self {
            classifier,
            min_confidence: None,
            fallback_label: UNKNOWN_PROFILE.to_string(),
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: Option<f64>, fallback_label: &str) -> Self {
        self.min_confidence = min_confidence;
        self.fallback_label = fallback_label.to_string();
        self
    }

    pub fn predict(&self, text: &str) -> Prediction {
        let prediction = self.classifier.predict_scored(text);

        match (self.min_confidence, prediction.confidence) {
            (Some(threshold), Some(confidence)) if confidence < threshold => Prediction {
                label: self.fallback_label.clone(),
                confidence: Some(confidence),
            },
            _ => prediction,
        }
    }

    /// Predict every document, keyed by file name
    pub fn predict_documents(&self, documents: &[Document]) -> HashMap<String, Prediction> {
        documents
            .iter()
            .map(|doc| (doc.file_name.clone(), self.predict(&doc.normalized_text)))
            .collect()
    }
}
