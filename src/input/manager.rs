//! Input manager for loading candidate documents

use crate::error::{Result, RankerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use crate::processing::document::Document;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// A file left out of the batch because its text could not be extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub file_name: String,
    pub reason: String,
}

/// Documents extracted from one directory, in extraction order.
#[derive(Debug, Clone, Default)]
pub struct DocumentBatch {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedDocument>,
}

impl DocumentBatch {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, file_name: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.file_name == file_name)
    }
}

pub struct InputManager {
    show_progress: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self { show_progress: false }
    }

    pub fn with_progress(mut self, enable: bool) -> Self {
        self.show_progress = enable;
        self
    }

    /// Extract the text of a single file, routed by its extension
    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(RankerError::MissingInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        match FileType::from_path(path) {
            FileType::Pdf => {
                debug!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await
            }
            FileType::Text => {
                debug!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await
            }
            FileType::Markdown => {
                debug!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await
            }
            FileType::Unknown => Err(RankerError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            ))),
        }
    }

    /// List supported documents of a directory, sorted by file name
    pub async fn list_documents(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(RankerError::MissingInput(format!(
                "Documents directory not found: {}",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && FileType::from_path(&path).is_supported() {
                paths.push(path);
            }
        }

        paths.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

        if paths.is_empty() {
            return Err(RankerError::MissingInput(format!(
                "No documents (.pdf, .txt, .md) found in {}",
                dir.display()
            )));
        }

        Ok(paths)
    }

    /// Extract and normalize every document of a directory.
    ///
    /// A file that fails to extract is logged and recorded in
    /// [`DocumentBatch::skipped`]; the rest of the batch is still processed.
    /// Errors that are not about a single document abort the load.
    pub async fn load_documents(&self, dir: &Path) -> Result<DocumentBatch> {
        let paths = self.list_documents(dir).await?;
        info!("Extracting {} documents from {}", paths.len(), dir.display());

        let progress = if self.show_progress {
            let bar = ProgressBar::new(paths.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut batch = DocumentBatch::default();
        for path in paths {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            progress.set_message(file_name.clone());

            match self.extract_text(&path).await {
                Ok(raw_text) => {
                    let order = batch.documents.len();
                    let document = Document::new(file_name, path, raw_text, order);
                    if document.is_blank() {
                        warn!("No extractable text in {} (scanned document?)", document.file_name);
                    }
                    batch.documents.push(document);
                }
                Err(e) if e.is_per_document() => {
                    warn!("Skipping {}: {}", file_name, e);
                    batch.skipped.push(SkippedDocument {
                        file_name,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    progress.finish_and_clear();
                    return Err(e);
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        if batch.is_empty() {
            return Err(RankerError::MissingInput(format!(
                "None of the documents in {} could be read",
                dir.display()
            )));
        }

        info!(
            "Extracted {} documents ({} skipped)",
            batch.documents.len(),
            batch.skipped.len()
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_documents_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), "Python developer").unwrap();
        std::fs::write(temp_dir.path().join("a.md"), "# Docker").unwrap();
        std::fs::write(temp_dir.path().join("ignored.zip"), "zip").unwrap();

        let batch = InputManager::new().load_documents(temp_dir.path()).await.unwrap();

        let names: Vec<&str> = batch.documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.txt"]);
        assert_eq!(batch.documents[1].order, 1);
        assert_eq!(batch.get("b.txt").unwrap().normalized_text, "python developer");
        assert!(batch.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_document_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("good.txt"), "SQL").unwrap();
        std::fs::write(temp_dir.path().join("broken.pdf"), b"%PDF-garbage").unwrap();

        let batch = InputManager::new().load_documents(temp_dir.path()).await.unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].file_name, "broken.pdf");
    }

    #[tokio::test]
    async fn test_invalid_utf8_text_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), [0x63, 0x61, 0x66, 0xe9]).unwrap();
        std::fs::write(temp_dir.path().join("b.md"), "Kotlin").unwrap();

        let batch = InputManager::new().load_documents(temp_dir.path()).await.unwrap();

        assert_eq!(batch.documents[0].file_name, "b.md");
        assert_eq!(batch.documents[0].order, 0);
        assert_eq!(batch.skipped[0].file_name, "a.txt");
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = InputManager::new()
            .load_documents(&temp_dir.path().join("nope"))
            .await;
        assert!(matches!(result, Err(RankerError::MissingInput(_))));
    }

    #[tokio::test]
    async fn test_directory_without_documents() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.docx"), "x").unwrap();
        let result = InputManager::new().load_documents(temp_dir.path()).await;
        assert!(matches!(result, Err(RankerError::MissingInput(_))));
    }
}
