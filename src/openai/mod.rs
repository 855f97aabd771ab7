// src/openai/mod.rs
pub mod client;
pub mod models;

pub use client::{OpenAiClient, EMBED_BATCH_SIZE};
