//! Markdown extractor.
//!
//! Markdown is indexed as written; the syntax itself is useful retrieval
//! signal, so no rendering or stripping is applied beyond normalization.

use async_trait::async_trait;
use docrag_core::{ExtractError, Extraction, Extractor, FileType, Page};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

use crate::clean::clean_text;

/// Extractor for Markdown files. The whole file is one logical page.
pub struct MarkdownExtractor;

impl MarkdownExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for MarkdownExtractor {
    fn format(&self) -> FileType {
        FileType::Md
    }

    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let bytes = fs::read(path).await?;
        let content = String::from_utf8_lossy(&bytes);
        let cleaned = clean_text(&content);

        let mut metadata = HashMap::new();
        metadata.insert("format".to_string(), "markdown".to_string());
        metadata.insert("char_count".to_string(), content.chars().count().to_string());

        Ok(Extraction {
            pages: vec![Page {
                page_number: 1,
                content: cleaned,
                metadata: HashMap::from([("format".to_string(), "markdown".to_string())]),
            }],
            total_pages: 1,
            metadata,
        })
    }
}
