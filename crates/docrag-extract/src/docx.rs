//! DOCX extractor.
//!
//! Walks the document body with `docx-rs`: paragraph text first, then table
//! content linearized into ` | `-delimited rows in reading order. DOCX has
//! no physical pagination, so the whole document is one logical page.

use async_trait::async_trait;
use docrag_core::{ExtractError, Extraction, Extractor, FileType, Page};
use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::clean::clean_text;

/// Extractor for DOCX files.
pub struct DocxExtractor;

impl DocxExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for DocxExtractor {
    fn format(&self) -> FileType {
        FileType::Docx
    }

    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        debug!(?path, "extracting docx");
        let bytes = tokio::fs::read(path).await?;

        tokio::task::spawn_blocking(move || extract_docx(&bytes))
            .await
            .map_err(|e| ExtractError::Parse(format!("extraction task failed: {e}")))?
    }
}

fn extract_docx(bytes: &[u8]) -> Result<Extraction, ExtractError> {
    let doc = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractError::Unreadable(format!("failed to read DOCX: {e}")))?;

    let mut paragraphs: Vec<String> = Vec::new();
    let mut table_rows: Vec<String> = Vec::new();

    for child in &doc.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                let text = paragraph_text(p);
                if !text.trim().is_empty() {
                    paragraphs.push(text);
                }
            }
            DocumentChild::Table(table) => {
                for row in &table.rows {
                    let TableChild::TableRow(row) = row;
                    let cells: Vec<String> = row
                        .cells
                        .iter()
                        .map(|cell| {
                            let TableRowChild::TableCell(cell) = cell;
                            cell.children
                                .iter()
                                .filter_map(|content| match content {
                                    TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                                    _ => None,
                                })
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .map(|text| text.trim().to_string())
                        .filter(|text| !text.is_empty())
                        .collect();

                    if !cells.is_empty() {
                        table_rows.push(cells.join(" | "));
                    }
                }
            }
            _ => {}
        }
    }

    let paragraph_count = paragraphs.len();
    // Tabular rows follow the paragraph text, rows in reading order.
    paragraphs.extend(table_rows);
    let full_text = paragraphs.join("\n\n");
    let cleaned = clean_text(&full_text);

    let mut metadata = HashMap::new();
    metadata.insert("format".to_string(), "docx".to_string());
    metadata.insert("paragraph_count".to_string(), paragraph_count.to_string());

    Ok(Extraction {
        pages: vec![Page {
            page_number: 1,
            content: cleaned,
            metadata: HashMap::from([("format".to_string(), "docx".to_string())]),
        }],
        total_pages: 1,
        metadata,
    })
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    paragraph
        .children
        .iter()
        .filter_map(|child| match child {
            ParagraphChild::Run(run) => Some(
                run.children
                    .iter()
                    .filter_map(|rc| match rc {
                        RunChild::Text(t) => Some(t.text.as_str()),
                        _ => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}
