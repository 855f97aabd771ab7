// src/edgar/client.rs
use std::collections::HashMap;
use std::time::Duration;

use reqwest::header;

use crate::edgar::models::{CompanySubmissions, FilingRef};
use crate::utils::error::EdgarError;

const TICKER_MAP_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// HTTP client for SEC EDGAR.
///
/// SEC asks for at most 10 requests/second and a descriptive User-Agent.
/// Every request waits `delay` before being sent; callers keep a single
/// client per run so the pacing applies across all of it.
pub struct EdgarClient {
    http: reqwest::Client,
    delay: Duration,
}

impl EdgarClient {
    pub fn new(user_agent: &str, delay: Duration) -> Result<Self, EdgarError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, delay })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, EdgarError> {
        tokio::time::sleep(self.delay).await;

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json,text/html,text/plain,*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::FORBIDDEN {
                tracing::warn!("Received 403 Forbidden from {} - check User-Agent and rate limits", url);
                return Err(EdgarError::RateLimited);
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(EdgarError::FilingDocNotFound(url.to_string()));
            }
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(EdgarError::Http(status));
        }

        Ok(response)
    }

    /// Loads the ticker -> zero-padded CIK mapping for every registrant.
    pub async fn ticker_map(&self) -> Result<HashMap<String, String>, EdgarError> {
        let json: serde_json::Value = self.get(TICKER_MAP_URL).await?.json().await?;
        let rows = json
            .as_object()
            .ok_or_else(|| EdgarError::Parse("company_tickers.json is not an object".to_string()))?;

        let mut mapping = HashMap::new();
        for row in rows.values() {
            let ticker = row
                .get("ticker")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_uppercase();
            let cik = row.get("cik_str").and_then(|c| c.as_u64());
            if let (false, Some(cik)) = (ticker.is_empty(), cik) {
                // CIKs are zero-padded to 10 digits in the submissions API
                mapping.insert(ticker, format!("{:010}", cik));
            }
        }
        Ok(mapping)
    }

    /// Fetches the company submission index for a given 10-digit CIK.
    pub async fn company_submissions(&self, cik: &str) -> Result<CompanySubmissions, EdgarError> {
        let url = format!("https://data.sec.gov/submissions/CIK{}.json", cik);
        let submissions = self.get(&url).await?.json().await?;
        Ok(submissions)
    }

    /// Downloads a filing document body as text.
    pub async fn download_filing_doc(&self, url: &str) -> Result<String, EdgarError> {
        tracing::debug!("Downloading document from {}", url);
        let body = self.get(url).await?.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Most recent filings for `ticker` whose form type is in `forms`,
    /// capped at `limit` per ticker.
    pub async fn recent_filings(
        &self,
        ticker: &str,
        cik: &str,
        forms: &[String],
        limit: usize,
    ) -> Result<Vec<FilingRef>, EdgarError> {
        let submissions = self.company_submissions(cik).await?;
        Ok(select_filings(ticker, cik, &submissions, forms, limit))
    }
}

/// Selects matching filings from the parallel arrays of a submissions
/// response. Entries with a missing accession/date/document are skipped.
pub fn select_filings(
    ticker: &str,
    cik: &str,
    submissions: &CompanySubmissions,
    forms: &[String],
    limit: usize,
) -> Vec<FilingRef> {
    let recent = &submissions.filings.recent;
    let mut selected = Vec::new();

    for (i, form) in recent.form.iter().enumerate() {
        if selected.len() == limit {
            break;
        }
        if !forms.iter().any(|f| f == form) {
            continue;
        }

        let (Some(accession), Some(filing_date), Some(primary_doc)) = (
            recent.accession_number.get(i),
            recent.filing_date.get(i),
            recent.primary_document.get(i),
        ) else {
            continue;
        };
        if primary_doc.is_empty() {
            continue;
        }

        selected.push(FilingRef {
            ticker: ticker.to_string(),
            company_name: submissions.name.clone(),
            cik: cik.to_string(),
            accession_number: accession.clone(),
            form_type: form.clone(),
            filing_date: filing_date.clone(),
            report_date: recent.report_date.get(i).filter(|d| !d.is_empty()).cloned(),
            primary_doc: primary_doc.clone(),
        });
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edgar::models::{Filings, RecentFilings};

    fn submissions() -> CompanySubmissions {
        CompanySubmissions {
            cik: "320193".to_string(),
            name: "Apple Inc.".to_string(),
            tickers: vec!["AAPL".to_string()],
            filings: Filings {
                recent: RecentFilings {
                    accession_number: vec![
                        "acc-0".to_string(),
                        "acc-1".to_string(),
                        "acc-2".to_string(),
                        "acc-3".to_string(),
                    ],
                    filing_date: vec![
                        "2024-08-01".to_string(),
                        "2024-07-15".to_string(),
                        "2024-06-30".to_string(),
                        "2024-06-01".to_string(),
                    ],
                    report_date: vec![
                        "2024-07-31".to_string(),
                        String::new(),
                        "2024-06-29".to_string(),
                        String::new(),
                    ],
                    form: vec![
                        "8-K".to_string(),
                        "10-Q".to_string(),
                        "8-K".to_string(),
                        "4".to_string(),
                    ],
                    primary_document: vec![
                        "doc0.htm".to_string(),
                        "doc1.htm".to_string(),
                        "doc2.htm".to_string(),
                        "doc3.htm".to_string(),
                    ],
                },
            },
        }
    }

    #[test]
    fn select_filings_filters_by_form() {
        let forms = vec!["8-K".to_string()];
        let selected = select_filings("AAPL", "0000320193", &submissions(), &forms, 8);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|f| f.form_type == "8-K"));
        assert_eq!(selected[0].accession_number, "acc-0");
        assert_eq!(selected[1].accession_number, "acc-2");
    }

    #[test]
    fn select_filings_respects_limit() {
        let forms = vec!["8-K".to_string(), "10-Q".to_string()];
        let selected = select_filings("AAPL", "0000320193", &submissions(), &forms, 2);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn select_filings_drops_empty_report_dates() {
        let forms = vec!["10-Q".to_string()];
        let selected = select_filings("AAPL", "0000320193", &submissions(), &forms, 8);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].report_date, None);
    }
}
