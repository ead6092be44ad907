//! Text extraction from various file formats

use crate::error::{Result, RankerError};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Extracts the text layer of every page. Image-only pages yield no text; there is no OCR.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = read_document(path).await?;
        let owned_path = path.to_path_buf();

        // pdf-extract panics on some malformed files, so parse on a blocking
        // task and treat a panic as an unreadable document.
        let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| RankerError::UnreadableDocument {
                path: owned_path.clone(),
                reason: format!("PDF parser aborted: {}", e),
            })?;

        extracted.map_err(|e| RankerError::UnreadableDocument {
            path: owned_path,
            reason: format!("Failed to extract text from PDF: {}", e),
        })
    }
}

async fn read_document(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).await.map_err(|e| RankerError::UnreadableDocument {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = read_document(path).await?;
        String::from_utf8(bytes).map_err(|e| RankerError::UnreadableDocument {
            path: path.to_path_buf(),
            reason: format!("File is not valid UTF-8: {}", e),
        })
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = PlainTextExtractor.extract(path).await?;

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Ok(Self::html_to_text(&html_output))
    }
}

impl MarkdownExtractor {
    fn html_to_text(html: &str) -> String {
        let text = html
            .replace("<br>", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n")
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'");

        let tag_regex = Regex::new(r"<[^>]*>").expect("Invalid tag regex");
        let clean_text = tag_regex.replace_all(&text, "");

        clean_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_markdown_is_stripped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cv.md");
        std::fs::write(&path, "# Ana Pérez\n\n**Skills**: Python & Docker\n\n- C++\n- .NET\n").unwrap();

        let text = MarkdownExtractor.extract(&path).await.unwrap();
        assert!(text.contains("Ana Pérez"));
        assert!(text.contains("Python & Docker"));
        assert!(text.contains("C++"));
        assert!(!text.contains("**"));
        assert!(!text.contains('#'));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let err = PdfExtractor.extract(&path).await.unwrap_err();
        assert!(matches!(err, RankerError::UnreadableDocument { .. }));
    }

    #[tokio::test]
    async fn test_invalid_utf8_text_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latin1.txt");
        std::fs::write(&path, [0x63, 0x61, 0x66, 0xe9]).unwrap();

        let err = PlainTextExtractor.extract(&path).await.unwrap_err();
        assert!(err.is_per_document());
    }
}
