// src/commands/fetch.rs
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use indicatif::ProgressBar;

use crate::config::{split_tickers, AppConfig};
use crate::edgar::models::RawFiling;
use crate::edgar::EdgarClient;
use crate::storage::DocStore;
use crate::utils::AppError;

/// Arguments for `fetch`: retrieve recent SEC filings for a set of tickers.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Comma-separated tickers; defaults to the TICKERS env var or the built-in list
    #[arg(long)]
    pub tickers: Option<String>,

    /// Comma-separated form types to keep
    #[arg(long, default_value = "8-K,10-Q")]
    pub forms: String,

    /// Filings to fetch per ticker
    #[arg(long, default_value_t = 8)]
    pub limit: usize,

    /// Seconds to pause between EDGAR requests
    #[arg(long, default_value_t = 0.25)]
    pub sleep: f64,

    /// Output directory for raw filings
    #[arg(long, default_value = "data/raw/sec")]
    pub out: PathBuf,
}

pub async fn run(config: &AppConfig, args: &FetchArgs) -> Result<(), AppError> {
    let tickers = match &args.tickers {
        Some(raw) => split_tickers(raw),
        None => config.default_tickers.clone(),
    };
    let forms = split_forms(&args.forms);
    if tickers.is_empty() || forms.is_empty() {
        return Err(AppError::Config(
            "at least one ticker and one form type are required".to_string(),
        ));
    }

    let client = EdgarClient::new(&config.sec_user_agent, Duration::from_secs_f64(args.sleep))?;
    let store = DocStore::new(&args.out)?;

    tracing::info!(
        "Fetching {:?} filings for {} tickers into {}",
        forms,
        tickers.len(),
        args.out.display()
    );
    let ticker_map = client.ticker_map().await?;

    let progress = ProgressBar::new(tickers.len() as u64);
    let mut saved = 0usize;
    for ticker in &tickers {
        let Some(cik) = ticker_map.get(ticker) else {
            tracing::warn!("No CIK found for {}. Skipping.", ticker);
            progress.inc(1);
            continue;
        };

        // a ticker whose listing fails should not sink the whole run
        let filings = match client.recent_filings(ticker, cik, &forms, args.limit).await {
            Ok(filings) => filings,
            Err(e) => {
                tracing::warn!("Failed to list filings for {}: {}", ticker, e);
                progress.inc(1);
                continue;
            }
        };

        for filing in filings {
            let url = filing.primary_doc_url();
            let raw_html = match client.download_filing_doc(&url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Failed doc {}: {}", url, e);
                    continue;
                }
            };

            let record = RawFiling {
                id: filing.document_id(),
                ticker: filing.ticker.clone(),
                source: "SEC_EDGAR".to_string(),
                doc_type: filing.form_type.clone(),
                cik: filing.cik.clone(),
                accession: filing.accession_number.clone(),
                filing_date: Some(filing.filing_date.clone()),
                report_date: filing.report_date.clone(),
                url,
                fetched_at: Utc::now().to_rfc3339(),
                raw_html,
            };
            store.save(&record.id, &record)?;
            saved += 1;
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    tracing::info!("Saved {} SEC filings to {}", saved, args.out.display());
    Ok(())
}

fn split_forms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_forms_trims_and_drops_empties() {
        assert_eq!(split_forms("8-K, 10-Q,,"), vec!["8-K", "10-Q"]);
    }
}
