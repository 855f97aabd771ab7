// src/edgar/models.rs
use serde::{Deserialize, Serialize};

/// The slice of the EDGAR company submission index we actually consume.
/// Example: https://data.sec.gov/submissions/CIK0000320193.json
#[derive(Debug, Deserialize)]
pub struct CompanySubmissions {
    pub cik: String,
    pub name: String,
    #[serde(default)]
    pub tickers: Vec<String>,
    pub filings: Filings,
}

#[derive(Debug, Deserialize)]
pub struct Filings {
    pub recent: RecentFilings,
}

/// Parallel arrays, one entry per filing. EDGAR omits some arrays for
/// sparse registrants, hence the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    #[serde(default)]
    pub accession_number: Vec<String>,
    #[serde(default)]
    pub filing_date: Vec<String>,
    #[serde(default)]
    pub report_date: Vec<String>,
    #[serde(default)]
    pub form: Vec<String>,
    #[serde(default)]
    pub primary_document: Vec<String>,
}

/// A single filing selected for download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingRef {
    pub ticker: String,
    pub company_name: String,
    pub cik: String,
    pub accession_number: String,
    pub form_type: String,
    pub filing_date: String,
    pub report_date: Option<String>,
    pub primary_doc: String,
}

impl FilingRef {
    /// Constructs the URL of the filing's primary document under the EDGAR
    /// archives. The archives path uses the CIK without leading zeros and
    /// the accession number without dashes.
    pub fn primary_doc_url(&self) -> String {
        let cik_short = self.cik.trim_start_matches('0');
        let accession = self.accession_number.replace('-', "");
        format!(
            "https://www.sec.gov/Archives/edgar/data/{}/{}/{}",
            cik_short, accession, self.primary_doc
        )
    }

    /// Stable document id used for raw filenames and chunk ids.
    pub fn document_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.ticker, self.accession_number, self.primary_doc
        )
    }
}

/// On-disk record of a fetched filing, raw HTML included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFiling {
    pub id: String,
    pub ticker: String,
    pub source: String,
    pub doc_type: String,
    pub cik: String,
    pub accession: String,
    pub filing_date: Option<String>,
    pub report_date: Option<String>,
    pub url: String,
    pub fetched_at: String,
    pub raw_html: String,
}
