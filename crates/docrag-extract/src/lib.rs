//! Content extraction for docrag.
//!
//! One extractor per supported format, all producing the same shape: an
//! ordered sequence of logical pages with cleaned text. Single-page formats
//! (txt, md, docx) report exactly one page; PDF reports one page per
//! physical page.
//!
//! Extractors are selected by the file-type tag declared at upload time.
//! An unknown tag is a configuration error, not a runtime fault.

pub mod clean;
pub mod docx;
pub mod markdown;
pub mod pdf;
pub mod text;

pub use clean::clean_text;
pub use docx::DocxExtractor;
pub use markdown::MarkdownExtractor;
pub use pdf::PdfExtractor;
pub use text::TextExtractor;

use docrag_core::{ConfigError, Extractor, FileType};

/// Select the extractor for a declared file type.
pub fn extractor_for(file_type: FileType) -> Box<dyn Extractor> {
    match file_type {
        FileType::Pdf => Box::new(PdfExtractor::new()),
        FileType::Docx => Box::new(DocxExtractor::new()),
        FileType::Txt => Box::new(TextExtractor::new()),
        FileType::Md => Box::new(MarkdownExtractor::new()),
    }
}

/// Select the extractor for a raw file-type tag.
///
/// Fails fast with a configuration error on an unsupported tag; this is
/// never retried.
pub fn extractor_for_tag(tag: &str) -> Result<Box<dyn Extractor>, ConfigError> {
    FileType::from_tag(tag)
        .map(extractor_for)
        .ok_or_else(|| ConfigError::UnsupportedFileType(tag.to_string()))
}
