//! Policy document parsing
//!
//! Extracts text from pdf/docx/eml/txt uploads and chunks it with
//! positional metadata. Any other extension is an `UnsupportedFileType`
//! fault, the one error allowed to reach the outer boundary.

use crate::error::{PolicyLensError, Result};
use crate::index::chunker::chunk_by_words;
use crate::store::ChunkMetadata;

/// Supported policy document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Docx,
    Eml,
    Txt,
}

/// One chunk of extracted document text
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Detect file type from the filename extension
pub fn detect_file_type(filename: &str) -> Result<FileType> {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Ok(FileType::Pdf),
        "docx" => Ok(FileType::Docx),
        "eml" => Ok(FileType::Eml),
        "txt" => Ok(FileType::Txt),
        _ => Err(PolicyLensError::UnsupportedFileType(ext)),
    }
}

/// Parses uploaded documents into chunks
pub struct DocumentParser {
    chunk_words: usize,
    overlap_words: usize,
}

impl DocumentParser {
    pub fn new(chunk_words: usize, overlap_words: usize) -> Self {
        Self {
            chunk_words,
            overlap_words,
        }
    }

    /// Parse a document into chunks with positional metadata
    pub fn parse(&self, file_bytes: &[u8], filename: &str) -> Result<Vec<DocumentChunk>> {
        match detect_file_type(filename)? {
            FileType::Pdf => self.parse_pdf(file_bytes, filename),
            FileType::Docx => self.parse_docx(file_bytes, filename),
            FileType::Eml => self.parse_eml(file_bytes, filename),
            FileType::Txt => {
                let text = String::from_utf8_lossy(file_bytes);
                Ok(self.chunk_single_page(&text, filename))
            }
        }
    }

    fn parse_pdf(&self, file_bytes: &[u8], filename: &str) -> Result<Vec<DocumentChunk>> {
        let text = pdf_extract::extract_text_from_mem(file_bytes).map_err(|e| {
            PolicyLensError::Parse(format!("Failed to extract text from PDF {}: {}", filename, e))
        })?;

        if text.trim().is_empty() {
            return Err(PolicyLensError::Parse(format!(
                "PDF {} contains no extractable text (may be image-based)",
                filename
            )));
        }

        // Form feeds separate pages where the extractor preserves them;
        // otherwise everything lands on page 1
        let mut chunks = Vec::new();
        for (page_idx, page_text) in text.split('\u{000C}').enumerate() {
            for (chunk_idx, chunk_text) in
                chunk_by_words(page_text, self.chunk_words, self.overlap_words)
                    .into_iter()
                    .enumerate()
            {
                chunks.push(DocumentChunk {
                    text: chunk_text,
                    metadata: ChunkMetadata {
                        clause_number: None,
                        filename: filename.to_string(),
                        page: page_idx as u32 + 1,
                        chunk_id: chunk_idx as u32,
                    },
                });
            }
        }
        Ok(chunks)
    }

    fn parse_docx(&self, file_bytes: &[u8], filename: &str) -> Result<Vec<DocumentChunk>> {
        let docx = docx_rs::read_docx(file_bytes).map_err(|e| {
            PolicyLensError::Parse(format!("Failed to read DOCX {}: {:?}", filename, e))
        })?;

        let mut full_text = String::new();
        for child in docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                for para_child in paragraph.children {
                    if let docx_rs::ParagraphChild::Run(run) = para_child {
                        for run_child in run.children {
                            if let docx_rs::RunChild::Text(text) = run_child {
                                full_text.push_str(&text.text);
                            }
                        }
                    }
                }
                full_text.push('\n');
            }
        }

        Ok(self.chunk_single_page(&full_text, filename))
    }

    fn parse_eml(&self, file_bytes: &[u8], filename: &str) -> Result<Vec<DocumentChunk>> {
        let message = mail_parser::MessageParser::default()
            .parse(file_bytes)
            .ok_or_else(|| {
                PolicyLensError::Parse(format!("Failed to parse EML message {}", filename))
            })?;

        let text = message.body_text(0).unwrap_or_default();
        Ok(self.chunk_single_page(&text, filename))
    }

    fn chunk_single_page(&self, text: &str, filename: &str) -> Vec<DocumentChunk> {
        chunk_by_words(text, self.chunk_words, self.overlap_words)
            .into_iter()
            .enumerate()
            .map(|(chunk_idx, chunk_text)| DocumentChunk {
                text: chunk_text,
                metadata: ChunkMetadata {
                    clause_number: None,
                    filename: filename.to_string(),
                    page: 1,
                    chunk_id: chunk_idx as u32,
                },
            })
            .collect()
    }
}
