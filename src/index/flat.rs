// src/index/flat.rs
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::IndexError;

/// Exact inner-product index over embedding vectors, kept flat in memory
/// and persisted as a single opaque binary file.
///
/// Inner product on unit vectors is cosine similarity; callers normalize
/// at index-build and query-embedding time, never inside `search`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlatIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored vectors.
    pub fn ntotal(&self) -> usize {
        self.vectors.len()
    }

    /// Appends vectors in order. Positions are assigned sequentially, which
    /// keeps the metadata store position-aligned as long as both sides are
    /// extended together.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), IndexError> {
        for vector in &vectors {
            if vector.len() != self.dim {
                return Err(IndexError::InvalidDimension {
                    expected: self.dim,
                    actual: vector.len(),
                });
            }
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    /// Top-`k` positions by inner product, highest score first. Always
    /// returns exactly `k` entries; when fewer vectors exist, the tail is
    /// padded with `(NEG_INFINITY, -1)` sentinels callers must discard.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, i64)>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::InvalidDimension {
                expected: self.dim,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(f32, i64)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(pos, vector)| (dot(query, vector), pos as i64))
            .collect();
        // stable sort: equal scores keep ascending position order
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        while scored.len() < k {
            scored.push((f32::NEG_INFINITY, -1));
        }
        Ok(scored)
    }

    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = bincode::serialize(self).map_err(|e| IndexError::Encode(e.to_string()))?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Err(IndexError::NotFound(path.display().to_string()));
        }
        let bytes = fs::read(path)?;
        bincode::deserialize(&bytes).map_err(|e| IndexError::Decode(e.to_string()))
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scales a vector to unit L2 norm in place. Zero vectors are left alone.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Normalizes a whole batch, as done once per build/update pass.
pub fn l2_normalize_all(vectors: &mut [Vec<f32>]) {
    for vector in vectors.iter_mut() {
        l2_normalize(vector);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_ranks_by_inner_product() {
        let mut index = FlatIndex::new(2);
        index
            .add(vec![vec![0.5, 0.0], vec![0.9, 0.0], vec![0.8, 0.0]])
            .unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        let positions: Vec<i64> = results.iter().map(|r| r.1).collect();
        assert_eq!(positions, vec![1, 2, 0]);
        assert!(results[0].0 > results[1].0 && results[1].0 > results[2].0);
    }

    #[test]
    fn search_pads_underfilled_index_with_sentinels() {
        let mut index = FlatIndex::new(2);
        index.add(vec![vec![1.0, 0.0]]).unwrap();

        let results = index.search(&[1.0, 0.0], 4).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].1, 0);
        assert!(results[1..].iter().all(|r| r.1 == -1));
    }

    #[test]
    fn search_is_stable_for_equal_scores() {
        let mut index = FlatIndex::new(2);
        index
            .add(vec![vec![0.7, 0.0], vec![0.7, 0.0], vec![0.7, 0.0]])
            .unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        let positions: Vec<i64> = results.iter().map(|r| r.1).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn add_rejects_dimension_mismatch() {
        let mut index = FlatIndex::new(3);
        let result = index.add(vec![vec![1.0, 0.0]]);
        assert!(matches!(
            result,
            Err(IndexError::InvalidDimension { expected: 3, actual: 2 })
        ));
        assert_eq!(index.ntotal(), 0);
    }

    #[test]
    fn search_rejects_dimension_mismatch() {
        let index = FlatIndex::new(3);
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sec.index");

        let mut index = FlatIndex::new(2);
        index.add(vec![vec![0.6, 0.8], vec![1.0, 0.0]]).unwrap();
        index.save(&path).unwrap();

        let loaded = FlatIndex::load(&path).unwrap();
        assert_eq!(loaded.dim(), 2);
        assert_eq!(loaded.ntotal(), 2);
        let results = loaded.search(&[0.6, 0.8], 1).unwrap();
        assert_eq!(results[0].1, 0);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FlatIndex::load(&dir.path().join("absent.index"));
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }

    #[test]
    fn l2_normalize_produces_unit_vectors() {
        let mut vector = vec![3.0, 4.0];
        l2_normalize(&mut vector);
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);

        // zero vectors pass through untouched
        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
