//! PDF extractor.
//!
//! Extracts text page by page with `lopdf`, so page provenance survives into
//! chunk metadata. Pages that clean to empty (image-only pages) are skipped,
//! but the physical page count is still reported.

use async_trait::async_trait;
use docrag_core::{ExtractError, Extraction, Extractor, FileType, Page};
use lopdf::Document;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::clean::clean_text;

/// Extractor for PDF files.
pub struct PdfExtractor;

impl PdfExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    fn format(&self) -> FileType {
        FileType::Pdf
    }

    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        debug!(?path, "extracting pdf");
        let bytes = tokio::fs::read(path).await?;

        // Parsing is CPU-bound; keep it off the async runtime.
        tokio::task::spawn_blocking(move || extract_pdf(&bytes))
            .await
            .map_err(|e| ExtractError::Parse(format!("extraction task failed: {e}")))?
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<Extraction, ExtractError> {
    // A container that does not parse at all is fundamentally unreadable.
    let doc = Document::load_mem(bytes)
        .map_err(|e| ExtractError::Unreadable(format!("failed to load PDF: {e}")))?;

    let page_map = doc.get_pages();
    let total_pages = page_map.len() as u32;
    let mut pages = Vec::new();

    for &page_number in page_map.keys() {
        match doc.extract_text(&[page_number]) {
            Ok(text) => {
                let cleaned = clean_text(&text);
                if !cleaned.is_empty() {
                    pages.push(Page {
                        page_number,
                        content: cleaned,
                        metadata: HashMap::from([("format".to_string(), "pdf".to_string())]),
                    });
                }
            }
            // A single undecodable page degrades; the rest of the document
            // still extracts.
            Err(e) => warn!(page = page_number, "failed to extract page text: {e}"),
        }
    }

    if pages.is_empty() {
        warn!(total_pages, "pdf produced no extractable text");
    }

    Ok(Extraction {
        pages,
        total_pages,
        metadata: HashMap::from([("format".to_string(), "pdf".to_string())]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tempfile::tempdir;

    /// Build a minimal PDF with one page per entry in `page_texts`.
    fn build_pdf(path: &Path, page_texts: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_extract_single_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.pdf");
        build_pdf(&path, &["Hello from page one"]);

        let extraction = PdfExtractor::new().extract(&path).await.unwrap();

        assert_eq!(extraction.total_pages, 1);
        assert_eq!(extraction.pages.len(), 1);
        assert_eq!(extraction.pages[0].page_number, 1);
        assert!(extraction.pages[0].content.contains("Hello from page one"));
    }

    #[tokio::test]
    async fn test_extract_pages_are_sequential() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        build_pdf(&path, &["alpha page", "beta page", "gamma page"]);

        let extraction = PdfExtractor::new().extract(&path).await.unwrap();

        assert_eq!(extraction.total_pages, 3);
        let numbers: Vec<u32> = extraction.pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(extraction.pages[1].content.contains("beta"));
    }

    #[tokio::test]
    async fn test_extract_corrupt_container_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-not really a pdf at all").unwrap();

        let result = PdfExtractor::new().extract(&path).await;
        assert!(matches!(result, Err(ExtractError::Unreadable(_))));
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let result = PdfExtractor::new()
            .extract(Path::new("/nonexistent/file.pdf"))
            .await;
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
