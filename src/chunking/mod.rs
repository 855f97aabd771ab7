// src/chunking/mod.rs
use serde::{Deserialize, Serialize};

use crate::preprocess::CleanDoc;
use crate::utils::error::AppError;

pub const DEFAULT_CHUNK_SIZE: usize = 1200;
pub const DEFAULT_OVERLAP: usize = 150;

/// Fixed-window character chunker.
///
/// Each window advances by `window - overlap` characters; the final chunk
/// is whatever remains once the cursor reaches the end of the document.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    window: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(window: usize, overlap: usize) -> Result<Self, AppError> {
        if window == 0 {
            return Err(AppError::Config("chunk window must be positive".to_string()));
        }
        if overlap >= window {
            return Err(AppError::Config(format!(
                "chunk overlap {} must be smaller than window {}",
                overlap, window
            )));
        }
        Ok(Self { window, overlap })
    }

    /// Splits `text` into chunks. Offsets are counted in characters, never
    /// splitting a UTF-8 code point. Chunks that trim to nothing are
    /// dropped without advancing differently.
    pub fn split(&self, text: &str) -> Vec<String> {
        // byte offset of every char boundary, plus the end of the text
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        let n = boundaries.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0usize;
        while start < n {
            let end = usize::min(start + self.window, n);
            let piece = text[boundaries[start]..boundaries[end]].trim();
            if !piece.is_empty() {
                chunks.push(piece.to_string());
            }
            if end == n {
                break;
            }
            // overlap < window guarantees forward progress
            start = end - self.overlap;
        }
        chunks
    }
}

/// The unit of retrieval: one fragment of one filing plus its source
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk_id: String,
    pub text: String,
    pub meta: ChunkMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub id: String,
    pub ticker: Option<String>,
    pub doc_type: Option<String>,
    pub filing_date: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
}

/// Chunks one cleaned document into retrieval records. Chunk ids are
/// `{document_id}::chunk_{ordinal}` so incremental updates can diff them.
pub fn chunk_document(doc: &CleanDoc, chunker: &Chunker) -> Vec<ChunkRecord> {
    chunker
        .split(&doc.text)
        .into_iter()
        .enumerate()
        .map(|(ordinal, text)| ChunkRecord {
            chunk_id: format!("{}::chunk_{}", doc.id, ordinal),
            text,
            meta: ChunkMeta {
                id: doc.id.clone(),
                ticker: Some(doc.ticker.clone()),
                doc_type: Some(doc.doc_type.clone()),
                filing_date: doc.filing_date.clone(),
                url: Some(doc.url.clone()),
                source: Some(doc.source.clone()),
            },
        })
        .collect()
}
