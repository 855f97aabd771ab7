// src/commands/report.rs
use std::fs;
use std::path::PathBuf;

use chrono::Local;
use clap::Args;

use crate::commands::{ask, chunk, clean, fetch, index};
use crate::commands::ask::AskOutcome;
use crate::config::AppConfig;
use crate::rag::answer::NO_MATCH_MESSAGE;
use crate::utils::AppError;

struct DailyQuestion {
    title: &'static str,
    question: &'static str,
    ticker: &'static str,
    doc_type: &'static str,
}

const DAILY_QUESTIONS: &[DailyQuestion] = &[
    DailyQuestion {
        title: "Market-moving disclosures (AMZN)",
        question: "What did Amazon disclose in its most recent 8-K?",
        ticker: "AMZN",
        doc_type: "8-K",
    },
    DailyQuestion {
        title: "Market-moving disclosures (AAPL)",
        question: "What did Apple disclose in its most recent 8-K?",
        ticker: "AAPL",
        doc_type: "8-K",
    },
    DailyQuestion {
        title: "Market-moving disclosures (TSLA)",
        question: "What did Tesla disclose in its most recent 8-K?",
        ticker: "TSLA",
        doc_type: "8-K",
    },
    DailyQuestion {
        title: "Big changes (NVDA)",
        question: "Summarize Nvidia's most recent 8-K.",
        ticker: "NVDA",
        doc_type: "8-K",
    },
    DailyQuestion {
        title: "Big changes (MSFT)",
        question: "Summarize Microsoft's most recent 8-K.",
        ticker: "MSFT",
        doc_type: "8-K",
    },
];

/// Arguments for `report`: refresh the corpus end to end, then answer the
/// standing question battery and write a dated brief.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Comma-separated tickers; defaults to the TICKERS env var or the built-in list
    #[arg(long)]
    pub tickers: Option<String>,

    /// Comma-separated form types to refresh
    #[arg(long, default_value = "8-K")]
    pub forms: String,

    /// Filings to fetch per ticker
    #[arg(long, default_value_t = 6)]
    pub limit: usize,

    /// Directory for report files
    #[arg(long, default_value = "reports")]
    pub out_dir: PathBuf,
}

pub async fn run(config: &AppConfig, args: &ReportArgs) -> Result<(), AppError> {
    // report needs the chat/embed API, so fail before doing any fetching
    config.require_openai_key()?;

    refresh_corpus(config, args).await?;

    let today = Local::now().format("%Y-%m-%d").to_string();
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Daily Financial Brief - {}", today));
    lines.push(format!(
        "Tickers: {}",
        args.tickers
            .clone()
            .unwrap_or_else(|| config.default_tickers.join(","))
    ));
    lines.push(String::new());

    for question in DAILY_QUESTIONS {
        tracing::info!("Asking: {}", question.question);
        lines.push("=".repeat(80));
        lines.push(question.title.to_string());
        lines.push("-".repeat(80));

        let ask_args = ask::AskArgs {
            question: question.question.to_string(),
            index: PathBuf::from("data/index/sec.index"),
            meta: PathBuf::from("data/index/sec_meta.json"),
            embed_model: crate::config::DEFAULT_EMBED_MODEL.to_string(),
            chat_model: crate::config::DEFAULT_CHAT_MODEL.to_string(),
            k: 80,
            ticker: Some(question.ticker.to_string()),
            doc_type: Some(question.doc_type.to_string()),
            most_recent: true,
            max_chunks: 10,
        };

        match ask::ask(config, &ask_args).await? {
            AskOutcome::NoMatches => lines.push(NO_MATCH_MESSAGE.to_string()),
            AskOutcome::Answered { answer, sources } => {
                let mut section = answer.trim().to_string();
                if let Some(first) = sources.first() {
                    section.push_str("\nSource: ");
                    section.push_str(first);
                }
                lines.push(section);
            }
        }
        lines.push(String::new());
    }

    fs::create_dir_all(&args.out_dir)?;
    let report_path = args.out_dir.join(format!("daily_{}.txt", today));
    fs::write(&report_path, lines.join("\n"))?;

    tracing::info!("Wrote report to {}", report_path.display());
    Ok(())
}

/// Runs fetch, clean, chunk, and the incremental index update with the
/// pipeline's default paths.
async fn refresh_corpus(config: &AppConfig, args: &ReportArgs) -> Result<(), AppError> {
    let fetch_args = fetch::FetchArgs {
        tickers: args.tickers.clone(),
        forms: args.forms.clone(),
        limit: args.limit,
        sleep: 0.25,
        out: PathBuf::from("data/raw/sec"),
    };
    fetch::run(config, &fetch_args).await?;

    clean::run(&clean::CleanArgs {
        in_dir: PathBuf::from("data/raw/sec"),
        out_dir: PathBuf::from("data/clean/sec"),
    })?;

    chunk::run(&chunk::ChunkArgs {
        in_dir: PathBuf::from("data/clean/sec"),
        out: PathBuf::from("data/chunks/sec_chunks.jsonl"),
        chunk_size: crate::chunking::DEFAULT_CHUNK_SIZE,
        overlap: crate::chunking::DEFAULT_OVERLAP,
    })?;

    index::update(
        config,
        &index::UpdateIndexArgs {
            chunks: PathBuf::from("data/chunks/sec_chunks.jsonl"),
            index: PathBuf::from("data/index/sec.index"),
            meta: PathBuf::from("data/index/sec_meta.json"),
            embed_model: crate::config::DEFAULT_EMBED_MODEL.to_string(),
        },
    )
    .await
}
