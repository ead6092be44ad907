//! Document structures

use crate::input::file_detector::FileType;
use crate::processing::normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A candidate document extracted during one run.
///
/// Identified by its file name; `order` is the position in extraction order
/// and is what ties in the ranking fall back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub file_name: String,
    pub path: PathBuf,
    pub raw_text: String,
    pub normalized_text: String,
    pub order: usize,
}

impl Document {
    pub fn new(file_name: String, path: PathBuf, raw_text: String, order: usize) -> Self {
        let normalized_text = normalize(&raw_text);

        Self {
            file_name,
            path,
            raw_text,
            normalized_text,
            order,
        }
    }

    /// Build a document straight from text, without a backing file
    pub fn from_text(file_name: &str, raw_text: &str, order: usize) -> Self {
        Self::new(
            file_name.to_string(),
            PathBuf::from(file_name),
            raw_text.to_string(),
            order,
        )
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_path(&self.path)
    }

    /// True when extraction produced no usable text (e.g. a scanned PDF)
    pub fn is_blank(&self) -> bool {
        self.normalized_text.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.normalized_text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let doc = Document::from_text("cv_ana.pdf", "Ana Pérez\nIngeniera de Datos — Python, SQL", 3);

        assert_eq!(doc.file_name, "cv_ana.pdf");
        assert_eq!(doc.order, 3);
        assert_eq!(doc.normalized_text, "ana perez ingeniera de datos python sql");
        assert_eq!(doc.word_count(), 7);
        assert_eq!(doc.file_type(), FileType::Pdf);
        assert!(!doc.is_blank());
    }

    #[test]
    fn test_blank_document() {
        let doc = Document::from_text("scan.pdf", "  \n\u{2022} \n", 0);
        assert!(doc.is_blank());
        assert_eq!(doc.word_count(), 0);
    }
}
