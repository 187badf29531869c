//! Clause store
//!
//! SQLite-backed storage for policy text chunks and their embeddings.
//! Embeddings are stored as little-endian f32 BLOBs; nearest-neighbor
//! queries compute cosine similarity in Rust over the stored vectors and
//! return clauses in relevance order.

use crate::error::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Positional metadata of a stored chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clause_number: Option<String>,
    pub filename: String,
    pub page: u32,
    pub chunk_id: u32,
}

impl ChunkMetadata {
    /// Deterministic storage id; re-ingesting a file overwrites its chunks
    pub fn storage_id(&self) -> String {
        format!("{}_{}_{}", self.filename, self.page, self.chunk_id)
    }
}

/// A retrieved chunk treated as a citable unit of policy text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedClause {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// SQLite-backed chunk store with brute-force cosine retrieval
pub struct ClauseStore {
    conn: Connection,
}

impl ClauseStore {
    /// Open (or create) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// In-memory store for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS clauses (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                clause_number TEXT,
                filename TEXT NOT NULL,
                page INTEGER NOT NULL,
                chunk_id INTEGER NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Add a chunk with its embedding; idempotent per storage id
    pub fn add(&self, text: &str, embedding: &[f32], metadata: &ChunkMetadata) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO clauses
                (id, text, clause_number, filename, page, chunk_id, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                metadata.storage_id(),
                text,
                metadata.clause_number,
                metadata.filename,
                metadata.page,
                metadata.chunk_id,
                embedding_to_bytes(embedding),
                now,
            ],
        )?;
        Ok(())
    }

    /// Top-k nearest clauses by cosine similarity, best first
    pub fn query(&self, query_embedding: &[f32], k: usize) -> Result<Vec<RetrievedClause>> {
        let mut stmt = self.conn.prepare(
            "SELECT text, clause_number, filename, page, chunk_id, embedding FROM clauses",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let embedding_bytes: Vec<u8> = row.get(5)?;
                Ok((
                    RetrievedClause {
                        text: row.get(0)?,
                        metadata: ChunkMetadata {
                            clause_number: row.get(1)?,
                            filename: row.get(2)?,
                            page: row.get(3)?,
                            chunk_id: row.get(4)?,
                        },
                    },
                    bytes_to_embedding(&embedding_bytes),
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut scored: Vec<(RetrievedClause, f32)> = rows
            .into_iter()
            .map(|(clause, embedding)| {
                let score = cosine_similarity(query_embedding, &embedding);
                (clause, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(clause, _)| clause)
            .collect())
    }

    /// Number of stored chunks
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM clauses", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(filename: &str, page: u32, chunk_id: u32) -> ChunkMetadata {
        ChunkMetadata {
            clause_number: None,
            filename: filename.to_string(),
            page,
            chunk_id,
        }
    }

    #[test]
    fn test_embedding_roundtrip() {
        let original = vec![1.0f32, 2.0, 3.0, -1.5];
        let bytes = embedding_to_bytes(&original);
        assert_eq!(bytes_to_embedding(&bytes), original);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 0.0001);
    }

    #[test]
    fn test_query_orders_by_relevance() {
        let store = ClauseStore::open_in_memory().unwrap();
        store
            .add("exact match", &[1.0, 0.0, 0.0], &meta("p.pdf", 1, 0))
            .unwrap();
        store
            .add("orthogonal", &[0.0, 1.0, 0.0], &meta("p.pdf", 1, 1))
            .unwrap();
        store
            .add("close match", &[0.9, 0.1, 0.0], &meta("p.pdf", 2, 0))
            .unwrap();

        let results = store.query(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "exact match");
        assert_eq!(results[1].text, "close match");
    }

    #[test]
    fn test_reingest_overwrites_same_id() {
        let store = ClauseStore::open_in_memory().unwrap();
        let metadata = meta("p.pdf", 1, 0);
        store.add("old text", &[1.0, 0.0], &metadata).unwrap();
        store.add("new text", &[1.0, 0.0], &metadata).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let results = store.query(&[1.0, 0.0], 1).unwrap();
        assert_eq!(results[0].text, "new text");
    }

    #[test]
    fn test_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clauses.db");
        {
            let store = ClauseStore::open(&path).unwrap();
            store
                .add("persisted clause", &[0.1, 0.2], &meta("p.pdf", 1, 0))
                .unwrap();
        }
        let store = ClauseStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let results = store.query(&[0.1, 0.2], 1).unwrap();
        assert_eq!(results[0].text, "persisted clause");
    }

    #[test]
    fn test_query_empty_store() {
        let store = ClauseStore::open_in_memory().unwrap();
        assert!(store.query(&[1.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_metadata_survives_roundtrip() {
        let store = ClauseStore::open_in_memory().unwrap();
        let metadata = ChunkMetadata {
            clause_number: Some("4.2".to_string()),
            filename: "policy.docx".to_string(),
            page: 3,
            chunk_id: 7,
        };
        store.add("clause text", &[0.5, 0.5], &metadata).unwrap();
        let results = store.query(&[0.5, 0.5], 1).unwrap();
        assert_eq!(results[0].metadata, metadata);
    }
}
