//! PDF document parser using pdf-extract
//!
//! Extracts text page by page so that page order survives into the joined
//! output even when a page has no extractable text.

use crate::{DocumentParser, FileType, ParsedDocument, ParserError, Result};
use std::any::Any;
use std::panic;

/// PDF document parser
pub struct PdfParser {
    /// Trim trailing whitespace left by the layout engine on each page
    pub trim_pages: bool,
}

impl PdfParser {
    /// Create a new PDF parser with default settings
    pub fn new() -> Self {
        Self { trim_pages: true }
    }

    /// Keep page text exactly as the extractor returns it
    pub fn with_page_trimming(mut self, enabled: bool) -> Self {
        self.trim_pages = enabled;
        self
    }

    /// Extract text for every page, in page order
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed documents instead of erroring
        let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|payload| {
                ParserError::PdfError(format!("Malformed PDF: {}", panic_message(&*payload)))
            })?
            .map_err(|e| ParserError::PdfError(e.to_string()))?;

        Ok(pages
            .into_iter()
            .map(|page| {
                if self.trim_pages {
                    page.trim_end().to_string()
                } else {
                    page
                }
            })
            .collect())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("extractor panicked")
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for PdfParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument> {
        let pages = self.extract_pages(bytes)?;
        Ok(ParsedDocument::new(FileType::Pdf, pages))
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Pdf]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{text_pdf, undefined_font_pdf};

    #[test]
    fn test_pdf_parser_creation() {
        let parser = PdfParser::new();
        assert!(parser.trim_pages);

        let parser = parser.with_page_trimming(false);
        assert!(!parser.trim_pages);
    }

    #[test]
    fn test_supported_types() {
        let parser = PdfParser::new();
        assert!(parser.can_parse(FileType::Pdf));
        assert!(!parser.can_parse(FileType::Docx));
    }

    #[test]
    fn test_pages_keep_their_order() {
        let bytes = text_pdf(&["John Doe Software Engineer", "", "Skills Python Go"]);
        let doc = PdfParser::new().parse(&bytes).unwrap();

        assert_eq!(doc.file_type, FileType::Pdf);
        assert_eq!(doc.segment_count(), 3);
        assert!(doc.segments[0].contains("John Doe"));
        assert_eq!(doc.segments[1].trim(), "");
        assert!(doc.segments[2].contains("Python"));

        let text = doc.text();
        let name = text.find("John Doe").unwrap();
        let skills = text.find("Python").unwrap();
        assert!(name < skills);
    }

    #[test]
    fn test_corrupt_pdf_is_an_error() {
        let parser = PdfParser::new();
        let err = parser.parse(b"this is not a pdf").unwrap_err();
        assert!(matches!(err, ParserError::PdfError(_)));
    }

    #[test]
    fn test_extractor_panic_is_an_error() {
        let err = PdfParser::new().parse(&undefined_font_pdf()).unwrap_err();
        assert!(matches!(err, ParserError::PdfError(_)));
    }

    #[test]
    fn test_registry_reports_malformed_pdf() {
        let err = crate::extract(&undefined_font_pdf(), "resume.pdf").unwrap_err();
        assert!(err.to_string().contains("Malformed PDF"));
    }
}
