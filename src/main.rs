// src/main.rs
use clap::{Parser, Subcommand};

use sec_analyst::commands::{ask, chunk, clean, fetch, index, report};
use sec_analyst::config::AppConfig;
use sec_analyst::utils::{self, AppError};

/// Retrieval-augmented question answering over SEC filings.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch recent SEC filings for a set of tickers
    Fetch(fetch::FetchArgs),
    /// Convert raw filing HTML into clean text documents
    Clean(clean::CleanArgs),
    /// Split cleaned documents into fixed-window chunks
    Chunk(chunk::ChunkArgs),
    /// Embed all chunks and build the vector index from scratch
    BuildIndex(index::BuildIndexArgs),
    /// Embed and append chunks not yet present in the index
    UpdateIndex(index::UpdateIndexArgs),
    /// Answer a question from the indexed filings
    Ask(ask::AskArgs),
    /// Refresh the corpus and write the daily brief
    Report(report::ReportArgs),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI arguments and read process configuration once
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    // 3. Dispatch to the requested pipeline stage
    match &cli.command {
        Command::Fetch(args) => fetch::run(&config, args).await,
        Command::Clean(args) => clean::run(args),
        Command::Chunk(args) => chunk::run(args),
        Command::BuildIndex(args) => index::build(&config, args).await,
        Command::UpdateIndex(args) => index::update(&config, args).await,
        Command::Ask(args) => ask::run(&config, args).await,
        Command::Report(args) => report::run(&config, args).await,
    }
}
