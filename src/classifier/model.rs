//! Fitted TF-IDF + logistic regression profile model and its artifacts

use crate::classifier::logistic::{LogisticRegression, TrainingParams};
use crate::classifier::tfidf::TfidfVectorizer;
use crate::classifier::{Classifier, Prediction};
use crate::error::{Result, RankerError};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileModel {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl ProfileModel {
    /// Fit vectorizer and classifier on normalized texts
    pub fn train<S: AsRef<str>>(texts: &[S], labels: &[String], params: &TrainingParams) -> Result<Self> {
        if texts.len() != labels.len() {
            return Err(RankerError::InvalidInput(format!(
                "{} training texts for {} labels",
                texts.len(),
                labels.len()
            )));
        }

        let distinct: std::collections::BTreeSet<&String> = labels.iter().collect();
        if distinct.len() < 2 {
            return Err(RankerError::DegenerateTraining(format!(
                "Training needs at least two distinct profiles, found {}",
                distinct.len()
            )));
        }

        let vectorizer = TfidfVectorizer::fit(texts)?;
        let features = vectorizer.transform_dense(texts);
        let classifier = LogisticRegression::fit(&features, labels, params)?;

        info!(
            "Trained profile model: {} documents, {} terms, {} profiles",
            texts.len(),
            vectorizer.vocabulary_size(),
            classifier.classes().len()
        );

        Ok(Self { vectorizer, classifier })
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn artifact_paths(dir: &Path) -> (PathBuf, PathBuf) {
        (dir.join(VECTORIZER_FILE), dir.join(CLASSIFIER_FILE))
    }

    pub fn artifacts_exist(dir: &Path) -> bool {
        let (vectorizer_path, classifier_path) = Self::artifact_paths(dir);
        vectorizer_path.is_file() && classifier_path.is_file()
    }

    /// Write `vectorizer.json` and `classifier.json` into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let (vectorizer_path, classifier_path) = Self::artifact_paths(dir);
        // both temporaries are written before either artifact is replaced
        let vectorizer_tmp = write_tmp_json(&vectorizer_path, &self.vectorizer)?;
        let classifier_tmp = write_tmp_json(&classifier_path, &self.classifier)?;
        std::fs::rename(&vectorizer_tmp, &vectorizer_path)?;
        std::fs::rename(&classifier_tmp, &classifier_path)?;
        info!("Saved profile model artifacts to {}", dir.display());
        Ok(())
    }

    /// Load both artifacts; missing, corrupt or mismatched files make the
    /// model unavailable
    pub fn load(dir: &Path) -> Result<Self> {
        let (vectorizer_path, classifier_path) = Self::artifact_paths(dir);
        let vectorizer: TfidfVectorizer = read_json(&vectorizer_path)?;
        let classifier: LogisticRegression = read_json(&classifier_path)?;

        vectorizer.check_consistency()?;
        classifier.check_shape(vectorizer.vocabulary_size())?;

        Ok(Self { vectorizer, classifier })
    }
}

fn write_tmp_json<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf> {
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, serde_json::to_vec(value)?)?;
    Ok(tmp_path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read(path).map_err(|e| {
        RankerError::ModelUnavailable(format!("Cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_slice(&content).map_err(|e| {
        RankerError::ModelUnavailable(format!("Corrupt model artifact {}: {}", path.display(), e))
    })
}

impl Classifier for ProfileModel {
    fn predict(&self, text: &str) -> String {
        self.predict_scored(text).label
    }

    fn predict_scored(&self, text: &str) -> Prediction {
        let (label, probability) = self.classifier.predict(&self.vectorizer.transform(text));
        Prediction {
            label,
            confidence: Some(probability),
        }
    }

    fn labels(&self) -> Vec<String> {
        self.classifier.classes().to_vec()
    }

    fn name(&self) -> &str {
        "tfidf-logistic"
    }
}
