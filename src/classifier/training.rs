//! Loading labeled resumes and training the profile model

use crate::classifier::logistic::TrainingParams;
use crate::classifier::model::ProfileModel;
use crate::config::ClassifierConfig;
use crate::error::{Result, RankerError};
use crate::input::manager::InputManager;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const FILE_COLUMNS: [&str; 5] = ["archivo", "file", "filename", "file_name", "cv"];
const LABEL_COLUMNS: [&str; 4] = ["perfil", "profile", "label", "etiqueta"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub file_name: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub documents_used: usize,
    pub profiles: BTreeMap<String, usize>,
    pub vocabulary_size: usize,
    /// Labeled files that were not found among the extracted documents
    pub missing_files: Vec<String>,
    pub skipped_documents: usize,
}

impl From<&ClassifierConfig> for TrainingParams {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            max_iter: config.max_iter,
            learning_rate: config.learning_rate,
            c: config.regularization,
        }
    }
}

/// Read a labels CSV with a file-name column and a profile column.
///
/// Column names are matched case-insensitively (`archivo`/`file`/`filename`,
/// `perfil`/`profile`/`label`); other columns are ignored.
pub fn load_labels(path: &Path) -> Result<Vec<LabeledExample>> {
    if !path.is_file() {
        return Err(RankerError::MissingInput(format!(
            "Labels file not found: {}",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let find_column = |candidates: &[&str]| {
        headers
            .iter()
            .position(|h| candidates.iter().any(|c| h.eq_ignore_ascii_case(c)))
    };

    let file_column = find_column(&FILE_COLUMNS).ok_or_else(|| {
        RankerError::InvalidInput(format!(
            "Labels file {} has no file-name column (expected one of: {})",
            path.display(),
            FILE_COLUMNS.join(", ")
        ))
    })?;
    let label_column = find_column(&LABEL_COLUMNS).ok_or_else(|| {
        RankerError::InvalidInput(format!(
            "Labels file {} has no profile column (expected one of: {})",
            path.display(),
            LABEL_COLUMNS.join(", ")
        ))
    })?;

    let mut examples = Vec::new();
    for record in reader.records() {
        let record = record?;
        match (record.get(file_column), record.get(label_column)) {
            (Some(file_name), Some(label)) if !file_name.is_empty() && !label.is_empty() => {
                examples.push(LabeledExample {
                    file_name: file_name.to_string(),
                    label: label.to_string(),
                });
            }
            _ => warn!("Ignoring incomplete labels row {:?}", record),
        }
    }

    Ok(examples)
}

/// Extract the labeled documents of `docs_dir`, fit the model and save it.
///
/// Nothing is written when the labels do not contain at least two profiles.
pub async fn train_from_directory(
    docs_dir: &Path,
    labels_path: &Path,
    artifacts_dir: &Path,
    params: &TrainingParams,
    input_manager: &InputManager,
) -> Result<(ProfileModel, TrainingSummary)> {
    let examples = load_labels(labels_path)?;
    let batch = input_manager.load_documents(docs_dir).await?;

    let mut texts = Vec::new();
    let mut labels = Vec::new();
    let mut missing_files = Vec::new();
    for example in &examples {
        match batch.get(&example.file_name) {
            Some(document) => {
                texts.push(document.normalized_text.clone());
                labels.push(example.label.clone());
            }
            None => {
                warn!("Labeled file {} not found among the documents", example.file_name);
                missing_files.push(example.file_name.clone());
            }
        }
    }

    if texts.is_empty() {
        return Err(RankerError::DegenerateTraining(format!(
            "None of the {} labeled files were found in {}",
            examples.len(),
            docs_dir.display()
        )));
    }

    info!("Training with {} labeled resumes", texts.len());
    let model = ProfileModel::train(&texts, &labels, params)?;
    model.save(artifacts_dir)?;

    let mut profiles = BTreeMap::new();
    for label in &labels {
        *profiles.entry(label.clone()).or_insert(0) += 1;
    }

    let summary = TrainingSummary {
        documents_used: texts.len(),
        profiles,
        vocabulary_size: model.vectorizer().vocabulary_size(),
        missing_files,
        skipped_documents: batch.skipped.len(),
    };

    Ok((model, summary))
}
