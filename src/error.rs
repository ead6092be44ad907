//! Error handling for the CV ranker

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Unreadable document '{}': {reason}", path.display())]
    UnreadableDocument { path: PathBuf, reason: String },

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Degenerate training data: {0}")]
    DegenerateTraining(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, RankerError>;

impl RankerError {
    /// Whether the failure only concerns a single document of the batch.
    pub fn is_per_document(&self) -> bool {
        matches!(
            self,
            RankerError::UnreadableDocument { .. } | RankerError::UnsupportedFormat(_)
        )
    }
}

/// model2vec-rs reports load failures through anyhow
impl From<anyhow::Error> for RankerError {
    fn from(err: anyhow::Error) -> Self {
        RankerError::ModelUnavailable(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_document_classification() {
        let unreadable = RankerError::UnreadableDocument {
            path: PathBuf::from("cv.pdf"),
            reason: "corrupt xref".to_string(),
        };
        assert!(unreadable.is_per_document());
        assert!(unreadable.to_string().contains("cv.pdf"));

        assert!(RankerError::UnsupportedFormat("cv.docx".to_string()).is_per_document());

        let missing = RankerError::MissingInput("no documents".to_string());
        assert!(!missing.is_per_document());
        assert!(!RankerError::ModelUnavailable("gone".to_string()).is_per_document());
    }

    #[test]
    fn test_anyhow_maps_to_model_unavailable() {
        let err: RankerError = anyhow::anyhow!("missing tokenizer")
            .context("Failed to load embedding model 'potion'")
            .into();
        match err {
            RankerError::ModelUnavailable(message) => {
                assert!(message.contains("potion"));
                assert!(message.contains("missing tokenizer"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
