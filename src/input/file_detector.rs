//! File type detection

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Text,
    Markdown,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "txt" => FileType::Text,
            "md" | "markdown" => FileType::Markdown,
            _ => FileType::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileType::Unknown)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FileType::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection() {
        assert_eq!(FileType::from_path(Path::new("cv_01.PDF")), FileType::Pdf);
        assert_eq!(FileType::from_path(Path::new("notes.markdown")), FileType::Markdown);
        assert_eq!(FileType::from_path(Path::new("job.txt")), FileType::Text);
        assert_eq!(FileType::from_path(Path::new("archive.zip")), FileType::Unknown);
        assert!(!FileType::from_path(Path::new("README")).is_supported());
    }
}
