// src/rag/mod.rs
pub mod answer;
pub mod engine;

pub use engine::{retrieve, RetrievalOptions, RetrievalOutcome, ScoredChunk};
