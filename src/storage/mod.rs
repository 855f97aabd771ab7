// src/storage/mod.rs
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::chunking::ChunkRecord;
use crate::utils::error::StorageError;

static FILENAME_SAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("Failed to compile FILENAME_SAFE_RE"));

/// Replaces filesystem-hostile characters with underscores and bounds the
/// name length.
pub fn safe_filename(name: &str) -> String {
    let safe = FILENAME_SAFE_RE.replace_all(name, "_");
    safe.chars().take(200).collect()
}

/// A directory of JSON documents, one pretty-printed file per record.
/// Used for both raw filings and cleaned docs.
pub struct DocStore {
    dir: PathBuf,
}

impl DocStore {
    /// Opens the store, creating the directory if it doesn't exist.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save<T: Serialize>(&self, id: &str, record: &T) -> Result<PathBuf, StorageError> {
        let path = self.dir.join(format!("{}.json", safe_filename(id)));
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Loads every `.json` record in the directory, sorted by filename for
    /// a stable processing order.
    pub fn load_all<T: DeserializeOwned>(&self) -> Result<Vec<(PathBuf, T)>, StorageError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let file = fs::File::open(&path)?;
            let record = serde_json::from_reader(BufReader::new(file))?;
            records.push((path, record));
        }
        Ok(records)
    }
}

/// Writes the chunk file: JSONL, one chunk per line, rewritten whole.
pub fn write_chunks(path: &Path, chunks: &[ChunkRecord]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    for chunk in chunks {
        serde_json::to_writer(&mut writer, chunk)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads the chunk file back, skipping blank lines.
pub fn read_chunks(path: &Path) -> Result<Vec<ChunkRecord>, StorageError> {
    if !path.exists() {
        return Err(StorageError::MissingInput(format!(
            "chunk file not found: {}",
            path.display()
        )));
    }
    let file = fs::File::open(path)?;
    let mut chunks = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        chunks.push(serde_json::from_str(&line)?);
    }
    Ok(chunks)
}
