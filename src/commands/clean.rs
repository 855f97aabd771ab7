// src/commands/clean.rs
use std::path::PathBuf;

use clap::Args;
use indicatif::ProgressBar;

use crate::edgar::models::RawFiling;
use crate::preprocess::clean_filing;
use crate::storage::DocStore;
use crate::utils::AppError;

/// Arguments for `clean`: convert raw filing HTML into clean text docs.
#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Directory of raw filings
    #[arg(long, default_value = "data/raw/sec")]
    pub in_dir: PathBuf,

    /// Output directory for cleaned docs
    #[arg(long, default_value = "data/clean/sec")]
    pub out_dir: PathBuf,
}

pub fn run(args: &CleanArgs) -> Result<(), AppError> {
    let raw_store = DocStore::new(&args.in_dir)?;
    let clean_store = DocStore::new(&args.out_dir)?;

    let raw_docs: Vec<(PathBuf, RawFiling)> = raw_store.load_all()?;
    if raw_docs.is_empty() {
        tracing::warn!("No raw filings in {}. Run fetch first.", args.in_dir.display());
        return Ok(());
    }

    let progress = ProgressBar::new(raw_docs.len() as u64);
    let mut saved = 0usize;
    for (path, raw) in &raw_docs {
        if let Some(doc) = clean_filing(raw) {
            // keep the raw file's name so re-runs overwrite in place
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(doc.id.as_str());
            clean_store.save(stem, &doc)?;
            saved += 1;
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    tracing::info!("Cleaned {} docs to {}", saved, args.out_dir.display());
    Ok(())
}
