// src/commands/index.rs
use std::path::PathBuf;

use clap::Args;
use indicatif::ProgressBar;

use crate::chunking::ChunkRecord;
use crate::config::{AppConfig, DEFAULT_EMBED_MODEL};
use crate::index::{l2_normalize_all, FlatIndex, MetaStore};
use crate::openai::{OpenAiClient, EMBED_BATCH_SIZE};
use crate::storage;
use crate::utils::AppError;

/// Arguments for `build-index`: embed every chunk and write the index and
/// metadata store from scratch.
#[derive(Debug, Args)]
pub struct BuildIndexArgs {
    /// Chunk file (JSONL)
    #[arg(long, default_value = "data/chunks/sec_chunks.jsonl")]
    pub chunks: PathBuf,

    /// Output vector index file
    #[arg(long, default_value = "data/index/sec.index")]
    pub index: PathBuf,

    /// Output metadata store file
    #[arg(long, default_value = "data/index/sec_meta.json")]
    pub meta: PathBuf,

    /// Embedding model
    #[arg(long, default_value = DEFAULT_EMBED_MODEL)]
    pub embed_model: String,
}

/// Arguments for `update-index`: embed and append only chunks whose ids
/// are not yet in the metadata store.
#[derive(Debug, Args)]
pub struct UpdateIndexArgs {
    /// Chunk file (JSONL)
    #[arg(long, default_value = "data/chunks/sec_chunks.jsonl")]
    pub chunks: PathBuf,

    /// Vector index file to extend
    #[arg(long, default_value = "data/index/sec.index")]
    pub index: PathBuf,

    /// Metadata store file to extend
    #[arg(long, default_value = "data/index/sec_meta.json")]
    pub meta: PathBuf,

    /// Embedding model
    #[arg(long, default_value = DEFAULT_EMBED_MODEL)]
    pub embed_model: String,
}

pub async fn build(config: &AppConfig, args: &BuildIndexArgs) -> Result<(), AppError> {
    let api_key = config.require_openai_key()?;
    let client = OpenAiClient::new(api_key)?;

    let chunks = storage::read_chunks(&args.chunks)?;
    if chunks.is_empty() {
        return Err(AppError::Config(format!(
            "no chunks found in {}",
            args.chunks.display()
        )));
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let mut vectors = embed_texts(&client, &texts, &args.embed_model).await?;
    l2_normalize_all(&mut vectors);

    let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
    let mut index = FlatIndex::new(dim);
    index.add(vectors)?;
    index.save(&args.index)?;

    let store = MetaStore::new(chunks);
    store.save(&args.meta)?;

    tracing::info!(
        "Saved index ({} vectors) to {}",
        index.ntotal(),
        args.index.display()
    );
    tracing::info!("Saved metadata to {}", args.meta.display());
    Ok(())
}

pub async fn update(config: &AppConfig, args: &UpdateIndexArgs) -> Result<(), AppError> {
    let api_key = config.require_openai_key()?;
    let client = OpenAiClient::new(api_key)?;

    let chunks = storage::read_chunks(&args.chunks)?;

    if !args.index.exists() || !args.meta.exists() {
        return Err(AppError::Config(
            "index/meta not found - run build-index first".to_string(),
        ));
    }
    let mut index = FlatIndex::load(&args.index)?;
    let mut store = MetaStore::load(&args.meta)?;

    let new_chunks: Vec<ChunkRecord> = {
        let existing = store.chunk_ids();
        chunks
            .into_iter()
            .filter(|c| !existing.contains(c.chunk_id.as_str()))
            .collect()
    };

    if new_chunks.is_empty() {
        tracing::info!("No new chunks to add. Index is up to date.");
        return Ok(());
    }

    let texts: Vec<String> = new_chunks.iter().map(|c| c.text.clone()).collect();
    let mut vectors = embed_texts(&client, &texts, &args.embed_model).await?;
    l2_normalize_all(&mut vectors);

    let added = new_chunks.len();
    // append-only and same order on both sides keeps positions aligned
    index.add(vectors)?;
    store.extend(new_chunks);

    index.save(&args.index)?;
    store.save(&args.meta)?;

    tracing::info!(
        "Added {} new chunks. Index now has {} vectors.",
        added,
        index.ntotal()
    );
    Ok(())
}

/// Embeds texts in sequential fixed-size batches; the first failed batch
/// aborts the run.
pub(crate) async fn embed_texts(
    client: &OpenAiClient,
    texts: &[String],
    model: &str,
) -> Result<Vec<Vec<f32>>, AppError> {
    let batches: Vec<&[String]> = texts.chunks(EMBED_BATCH_SIZE).collect();
    let progress = ProgressBar::new(batches.len() as u64);

    let mut vectors = Vec::with_capacity(texts.len());
    for batch in batches {
        vectors.extend(client.embed_batch(batch, model).await?);
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(vectors)
}
