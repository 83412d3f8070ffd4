//! cvsearch Parser - Text extraction for uploaded resumes
//!
//! Supports parsing of:
//! - PDF documents (text per page, pages joined by newlines)
//! - Microsoft Word (DOCX, body paragraphs joined by newlines)
//!
//! Each parser implements the `DocumentParser` trait over in-memory bytes
//! and produces a `ParsedDocument`. Any other format is rejected before a
//! parser is chosen.

use std::path::Path;
use thiserror::Error;

pub mod docx;
pub mod pdf;

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures;

pub use docx::DocxParser;
pub use pdf::PdfParser;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during document parsing
#[derive(Error, Debug)]
pub enum ParserError {
    /// File format is not supported
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// PDF parsing error
    #[error("PDF parsing error: {0}")]
    PdfError(String),

    /// DOCX parsing error
    #[error("DOCX parsing error: {0}")]
    DocxError(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl From<ParserError> for cvsearch_core::CvError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::UnsupportedFormat(ext) => Self::UnsupportedFormat(ext),
            other => Self::Extraction(other.to_string()),
        }
    }
}

// ============================================================================
// Parsed Document Types
// ============================================================================

/// A parsed document with extracted content
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Detected file type
    pub file_type: FileType,

    /// Text units in document order: pages for PDF, paragraphs for DOCX
    pub segments: Vec<String>,
}

impl ParsedDocument {
    /// Create a parsed document from its ordered segments
    pub fn new(file_type: FileType, segments: Vec<String>) -> Self {
        Self {
            file_type,
            segments,
        }
    }

    /// Full text, segments joined with newlines
    pub fn text(&self) -> String {
        self.segments.join("\n")
    }

    /// Number of pages or paragraphs
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Get total word count (approximate)
    pub fn word_count(&self) -> usize {
        self.segments
            .iter()
            .map(|s| s.split_whitespace().count())
            .sum()
    }
}

/// Supported file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Docx,
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from an uploaded file name
    pub fn from_filename(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Parser Trait
// ============================================================================

/// Trait for document parsers
pub trait DocumentParser: Send + Sync {
    /// Parse a document from its raw bytes
    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument>;

    /// Get supported file types
    fn supported_types(&self) -> &[FileType];

    /// Check if this parser can handle a file type
    fn can_parse(&self, file_type: FileType) -> bool {
        self.supported_types().contains(&file_type)
    }
}

// ============================================================================
// Parser Registry
// ============================================================================

/// Registry of available parsers
pub struct ParserRegistry {
    parsers: Vec<Box<dyn DocumentParser>>,
}

impl ParserRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Registry with the PDF and DOCX parsers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PdfParser::new());
        registry.register(DocxParser::new());
        registry
    }

    /// Register a parser
    pub fn register<P: DocumentParser + 'static>(&mut self, parser: P) {
        self.parsers.push(Box::new(parser));
    }

    /// Find a parser for a file type
    pub fn find_parser(&self, file_type: FileType) -> Option<&dyn DocumentParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(file_type))
            .map(|p| p.as_ref())
    }

    /// Parse uploaded bytes using the parser matching the file name
    pub fn parse(&self, bytes: &[u8], filename: &str) -> Result<ParsedDocument> {
        let file_type = FileType::from_filename(filename);

        if file_type == FileType::Unknown {
            return Err(ParserError::UnsupportedFormat(
                Path::new(filename)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("none")
                    .to_string(),
            ));
        }

        let parser = self
            .find_parser(file_type)
            .ok_or_else(|| ParserError::UnsupportedFormat(file_type.to_string()))?;

        let doc = parser.parse(bytes)?;
        tracing::debug!(
            filename,
            file_type = %doc.file_type,
            segments = doc.segment_count(),
            words = doc.word_count(),
            "Extracted document text"
        );
        Ok(doc)
    }

    /// Extract plain text from uploaded bytes
    pub fn extract(&self, bytes: &[u8], filename: &str) -> Result<String> {
        self.parse(bytes, filename).map(|doc| doc.text())
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Extract plain text from an uploaded PDF or DOCX
pub fn extract(bytes: &[u8], filename: &str) -> Result<String> {
    ParserRegistry::with_defaults().extract(bytes, filename)
}

// ============================================================================
// Tests
// ============================================================================
