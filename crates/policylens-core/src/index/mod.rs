//! Document ingestion: format parsing and chunking

pub mod chunker;
pub mod parser;

pub use chunker::{chunk_by_words, CHUNK_OVERLAP_WORDS, CHUNK_SIZE_WORDS};
pub use parser::{detect_file_type, DocumentChunk, DocumentParser, FileType};
