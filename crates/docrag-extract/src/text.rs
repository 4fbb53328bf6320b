//! Plain text extractor.

use async_trait::async_trait;
use docrag_core::{ExtractError, Extraction, Extractor, FileType, Page};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

use crate::clean::clean_text;

/// Extractor for plain text files. The whole file is one logical page.
pub struct TextExtractor;

impl TextExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for TextExtractor {
    fn format(&self) -> FileType {
        FileType::Txt
    }

    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let bytes = fs::read(path).await?;
        // Invalid UTF-8 degrades to replacement characters rather than
        // failing the extraction.
        let content = String::from_utf8_lossy(&bytes);
        let cleaned = clean_text(&content);

        let mut metadata = HashMap::new();
        metadata.insert("format".to_string(), "txt".to_string());
        metadata.insert("char_count".to_string(), content.chars().count().to_string());

        Ok(Extraction {
            pages: vec![Page {
                page_number: 1,
                content: cleaned,
                metadata: HashMap::from([("format".to_string(), "txt".to_string())]),
            }],
            total_pages: 1,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_extract_simple_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "Hello world\n\nThis is a test document.").unwrap();

        let extraction = TextExtractor::new().extract(&path).await.unwrap();

        assert_eq!(extraction.total_pages, 1);
        assert_eq!(extraction.pages.len(), 1);
        assert_eq!(extraction.pages[0].page_number, 1);
        assert!(extraction.pages[0].content.contains("Hello world"));
    }

    #[tokio::test]
    async fn test_extract_cleans_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messy.txt");
        std::fs::write(&path, "  first  \r\n\r\n\r\n  second  ").unwrap();

        let extraction = TextExtractor::new().extract(&path).await.unwrap();

        assert_eq!(extraction.pages[0].content, "first\n\nsecond");
    }

    #[tokio::test]
    async fn test_extract_empty_file_is_one_empty_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let extraction = TextExtractor::new().extract(&path).await.unwrap();

        assert_eq!(extraction.total_pages, 1);
        assert_eq!(extraction.pages[0].content, "");
    }

    #[tokio::test]
    async fn test_extract_invalid_utf8_substitutes_replacement() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();

        let extraction = TextExtractor::new().extract(&path).await.unwrap();

        assert!(extraction.pages[0].content.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let result = TextExtractor::new()
            .extract(Path::new("/nonexistent/file.txt"))
            .await;
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
