// src/index/meta.rs
use std::collections::HashSet;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::chunking::ChunkRecord;
use crate::utils::error::StorageError;

/// Position-aligned companion to the vector index: element `i` describes
/// vector `i`. Append-only; both sides are extended in the same order.
#[derive(Debug, Default)]
pub struct MetaStore {
    records: Vec<ChunkRecord>,
}

impl MetaStore {
    pub fn new(records: Vec<ChunkRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ChunkRecord> {
        self.records.get(position)
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    pub fn extend(&mut self, records: Vec<ChunkRecord>) {
        self.records.extend(records);
    }

    /// Chunk ids already indexed, for incremental-update set difference.
    pub fn chunk_ids(&self) -> HashSet<&str> {
        self.records.iter().map(|r| r.chunk_id.as_str()).collect()
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            return Err(StorageError::MissingInput(format!(
                "metadata store not found: {}",
                path.display()
            )));
        }
        let file = fs::File::open(path)?;
        let records = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self { records })
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), &self.records)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkMeta;

    fn record(chunk_id: &str) -> ChunkRecord {
        ChunkRecord {
            chunk_id: chunk_id.to_string(),
            text: "text".to_string(),
            meta: ChunkMeta::default(),
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sec_meta.json");

        let store = MetaStore::new(vec![record("a::chunk_0"), record("a::chunk_1")]);
        store.save(&path).unwrap();

        let loaded = MetaStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(1).unwrap().chunk_id, "a::chunk_1");
        assert!(loaded.get(2).is_none());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = MetaStore::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(StorageError::MissingInput(_))));
    }

    #[test]
    fn chunk_ids_supports_set_difference() {
        let store = MetaStore::new(vec![record("a::chunk_0"), record("b::chunk_0")]);
        let ids = store.chunk_ids();
        assert!(ids.contains("a::chunk_0"));
        assert!(!ids.contains("c::chunk_0"));
    }
}
