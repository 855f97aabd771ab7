// src/commands/ask.rs
use std::path::PathBuf;

use clap::Args;

use crate::config::{AppConfig, DEFAULT_CHAT_MODEL, DEFAULT_EMBED_MODEL};
use crate::index::{l2_normalize, FlatIndex, MetaStore};
use crate::openai::OpenAiClient;
use crate::rag::answer::{self, NO_MATCH_MESSAGE};
use crate::rag::{retrieve, RetrievalOptions, RetrievalOutcome};
use crate::utils::AppError;

/// Arguments for `ask`: answer a question from the indexed filings.
#[derive(Debug, Args)]
pub struct AskArgs {
    /// Natural-language question
    pub question: String,

    /// Vector index file
    #[arg(long, default_value = "data/index/sec.index")]
    pub index: PathBuf,

    /// Metadata store file
    #[arg(long, default_value = "data/index/sec_meta.json")]
    pub meta: PathBuf,

    /// Embedding model
    #[arg(long, default_value = DEFAULT_EMBED_MODEL)]
    pub embed_model: String,

    /// Chat model
    #[arg(long, default_value = DEFAULT_CHAT_MODEL)]
    pub chat_model: String,

    /// Candidates to retrieve before filtering
    #[arg(long, default_value_t = 25)]
    pub k: usize,

    /// Keep only chunks for this ticker, e.g. AMZN
    #[arg(long)]
    pub ticker: Option<String>,

    /// Keep only chunks of this form type, e.g. 8-K
    #[arg(long)]
    pub doc_type: Option<String>,

    /// After filtering, keep only the most recently filed document
    #[arg(long)]
    pub most_recent: bool,

    /// Chunks to include in the generation context
    #[arg(long, default_value_t = 8)]
    pub max_chunks: usize,
}

/// What `ask` produced, separated from printing so the report command can
/// reuse it.
#[derive(Debug)]
pub enum AskOutcome {
    NoMatches,
    Answered {
        answer: String,
        sources: Vec<String>,
    },
}

pub async fn run(config: &AppConfig, args: &AskArgs) -> Result<(), AppError> {
    match ask(config, args).await? {
        AskOutcome::NoMatches => {
            println!("\n=== Answer ===\n");
            println!("{}", NO_MATCH_MESSAGE);
        }
        AskOutcome::Answered { answer, sources } => {
            println!("\n=== Answer ===\n");
            println!("{}", answer);
            println!("\n=== Sources (top hits) ===");
            for source in &sources {
                println!("- {}", source);
            }
        }
    }
    Ok(())
}

pub async fn ask(config: &AppConfig, args: &AskArgs) -> Result<AskOutcome, AppError> {
    let api_key = config.require_openai_key()?;
    let client = OpenAiClient::new(api_key)?;

    // nothing to search without a built index
    let index = FlatIndex::load(&args.index)?;
    let store = MetaStore::load(&args.meta)?;

    let mut query = client.embed_query(&args.question, &args.embed_model).await?;
    l2_normalize(&mut query);

    let options = RetrievalOptions {
        k: args.k,
        ticker: normalize_filter(args.ticker.as_deref()),
        doc_type: normalize_filter(args.doc_type.as_deref()),
        most_recent: args.most_recent,
        max_chunks: args.max_chunks,
    };

    match retrieve(&index, &store, &query, &options)? {
        RetrievalOutcome::Empty => Ok(AskOutcome::NoMatches),
        RetrievalOutcome::Hits { chunks, sources } => {
            let answer =
                answer::synthesize(&client, &args.question, &chunks, &args.chat_model).await?;
            Ok(AskOutcome::Answered { answer, sources })
        }
    }
}

/// Blank filter flags behave as if they were not passed at all.
fn normalize_filter(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_filter_drops_blank_values() {
        assert_eq!(normalize_filter(None), None);
        assert_eq!(normalize_filter(Some("")), None);
        assert_eq!(normalize_filter(Some("   ")), None);
        assert_eq!(normalize_filter(Some(" 8-K ")), Some("8-K".to_string()));
    }
}
