// src/preprocess/mod.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::edgar::models::RawFiling;

/// Cleaned docs shorter than this are noise (stub pages, redirect shells).
pub const MIN_CLEAN_TEXT_LEN: usize = 200;

// --- Regex Patterns for Text Cleanup (Lazy Static) ---
// The regex crate has no backreferences, so each tag gets its own branch.
static STRIP_BLOCKS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<noscript\b[^>]*>.*?</noscript\s*>",
    )
    .expect("Failed to compile STRIP_BLOCKS_RE")
});

static EXCESS_NEWLINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Failed to compile EXCESS_NEWLINES_RE"));

static EXCESS_SPACES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("Failed to compile EXCESS_SPACES_RE"));

/// A filing reduced to plain text, ready for chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanDoc {
    pub id: String,
    pub text: String,
    pub ticker: String,
    pub source: String,
    pub doc_type: String,
    pub cik: String,
    pub accession: String,
    pub filing_date: Option<String>,
    pub report_date: Option<String>,
    pub url: String,
    pub fetched_at: String,
}

/// Converts filing HTML to plain text.
///
/// Drops script/style/noscript blocks, joins the remaining DOM text nodes
/// with newlines, then normalizes line endings and collapses whitespace
/// runs so the chunker sees compact prose.
pub fn html_to_text(html: &str) -> String {
    let stripped = STRIP_BLOCKS_RE.replace_all(html, " ");
    let document = Html::parse_document(&stripped);
    let text = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join("\n");

    let text = text.replace('\r', "\n");
    let text = EXCESS_NEWLINES_RE.replace_all(&text, "\n\n");
    let text = EXCESS_SPACES_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Cleans one raw filing. Returns `None` when there is no HTML or the
/// extracted text is too short to be a usable filing body.
pub fn clean_filing(raw: &RawFiling) -> Option<CleanDoc> {
    if raw.raw_html.is_empty() {
        return None;
    }

    let text = html_to_text(&raw.raw_html);
    if text.len() < MIN_CLEAN_TEXT_LEN {
        tracing::debug!("Dropping {}: cleaned text too short ({} bytes)", raw.id, text.len());
        return None;
    }

    Some(CleanDoc {
        id: raw.id.clone(),
        text,
        ticker: raw.ticker.clone(),
        source: raw.source.clone(),
        doc_type: raw.doc_type.clone(),
        cik: raw.cik.clone(),
        accession: raw.accession.clone(),
        filing_date: raw.filing_date.clone(),
        report_date: raw.report_date.clone(),
        url: raw.url.clone(),
        fetched_at: raw.fetched_at.clone(),
    })
}
