//! DOCX document parser using docx-rs
//!
//! Extracts body paragraph text from Microsoft Word documents in document
//! order. Table contents are not part of the paragraph stream.

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

use crate::{DocumentParser, FileType, ParsedDocument, ParserError, Result};

/// DOCX document parser
pub struct DocxParser;

impl DocxParser {
    /// Create a new DOCX parser
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Append the visible text of paragraph children to `out`
fn collect_text(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(text) => out.push_str(&text.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_text(&link.children, out),
            _ => {}
        }
    }
}

impl DocumentParser for DocxParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument> {
        let docx = read_docx(bytes).map_err(|e| ParserError::DocxError(e.to_string()))?;

        let paragraphs = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(para) => {
                    let mut text = String::new();
                    collect_text(&para.children, &mut text);
                    Some(text)
                }
                _ => None,
            })
            .collect();

        Ok(ParsedDocument::new(FileType::Docx, paragraphs))
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Docx]
    }
}
