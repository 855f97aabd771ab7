// src/commands/chunk.rs
use std::path::PathBuf;

use clap::Args;

use crate::chunking::{chunk_document, Chunker, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::preprocess::CleanDoc;
use crate::storage::{self, DocStore};
use crate::utils::AppError;

/// Arguments for `chunk`: split cleaned docs into fixed-window chunks.
#[derive(Debug, Args)]
pub struct ChunkArgs {
    /// Directory of cleaned docs
    #[arg(long, default_value = "data/clean/sec")]
    pub in_dir: PathBuf,

    /// Output chunk file (JSONL)
    #[arg(long, default_value = "data/chunks/sec_chunks.jsonl")]
    pub out: PathBuf,

    /// Window size in characters
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Overlap between consecutive windows, in characters
    #[arg(long, default_value_t = DEFAULT_OVERLAP)]
    pub overlap: usize,
}

pub fn run(args: &ChunkArgs) -> Result<(), AppError> {
    let chunker = Chunker::new(args.chunk_size, args.overlap)?;
    let store = DocStore::new(&args.in_dir)?;

    let docs: Vec<(PathBuf, CleanDoc)> = store.load_all()?;
    if docs.is_empty() {
        tracing::warn!("No cleaned docs found in {}", args.in_dir.display());
        return Ok(());
    }

    let mut chunks = Vec::new();
    for (_, doc) in &docs {
        if doc.text.is_empty() {
            continue;
        }
        chunks.extend(chunk_document(doc, &chunker));
    }

    storage::write_chunks(&args.out, &chunks)?;
    tracing::info!("Wrote {} chunks to {}", chunks.len(), args.out.display());
    Ok(())
}
