// src/rag/engine.rs
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::chunking::ChunkRecord;
use crate::index::{FlatIndex, MetaStore};
use crate::utils::error::IndexError;

/// Maximum number of source URLs reported alongside an answer.
pub const MAX_SOURCES: usize = 5;

/// Knobs for one retrieval pass.
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    /// Candidates to pull from the index before filtering.
    pub k: usize,
    /// Keep only chunks for this ticker (case-insensitive exact match).
    pub ticker: Option<String>,
    /// Keep only chunks of this form type (case-insensitive exact match).
    pub doc_type: Option<String>,
    /// After filtering, narrow to the single most recently filed document.
    pub most_recent: bool,
    /// Chunks to keep as generation context.
    pub max_chunks: usize,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            k: 25,
            ticker: None,
            doc_type: None,
            most_recent: false,
            max_chunks: 8,
        }
    }
}

/// One retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk<'a> {
    pub score: f32,
    pub chunk: &'a ChunkRecord,
}

/// Outcome of a retrieval pass.
///
/// `Empty` is a first-class result, not an error: filters that eliminate
/// every candidate must surface as "no matching documents", and the
/// synthesizer is never invoked with empty context.
#[derive(Debug)]
pub enum RetrievalOutcome<'a> {
    Empty,
    Hits {
        chunks: Vec<ScoredChunk<'a>>,
        /// First-seen non-empty source URLs of the returned chunks,
        /// capped at [`MAX_SOURCES`].
        sources: Vec<String>,
    },
}

/// Retrieves, filters, and ranks chunks to ground an answer.
///
/// The index is queried for `k` candidates; ticker and doc-type filters
/// are ANDed; the optional most-recent pass narrows to one document; the
/// survivors are stable-sorted by score and truncated to `max_chunks`.
pub fn retrieve<'a>(
    index: &FlatIndex,
    store: &'a MetaStore,
    query: &[f32],
    options: &RetrievalOptions,
) -> Result<RetrievalOutcome<'a>, IndexError> {
    let results = index.search(query, options.k)?;

    let mut hits: Vec<ScoredChunk<'a>> = Vec::with_capacity(results.len());
    for (score, position) in results {
        if position < 0 {
            // under-filled index sentinel
            continue;
        }
        // positions past the store length can only appear after an
        // interrupted update; skip rather than fail the whole query
        if let Some(chunk) = store.get(position as usize) {
            hits.push(ScoredChunk { score, chunk });
        }
    }

    if let Some(ticker) = &options.ticker {
        hits.retain(|hit| field_matches(hit.chunk.meta.ticker.as_deref(), ticker));
    }
    if let Some(doc_type) = &options.doc_type {
        hits.retain(|hit| field_matches(hit.chunk.meta.doc_type.as_deref(), doc_type));
    }

    if hits.is_empty() {
        return Ok(RetrievalOutcome::Empty);
    }

    if options.most_recent {
        hits = most_recent_document(hits);
    }

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    hits.truncate(options.max_chunks);

    let sources = collect_sources(&hits, MAX_SOURCES);
    Ok(RetrievalOutcome::Hits { chunks: hits, sources })
}

/// Case-insensitive exact match; a missing field never matches an active
/// filter.
fn field_matches(field: Option<&str>, wanted: &str) -> bool {
    field
        .map(|value| value.eq_ignore_ascii_case(wanted.trim()))
        .unwrap_or(false)
}

/// Narrows candidates to the chunks of the single document with the latest
/// filing date.
///
/// Grouping is by source URL in first-seen order, so an exact date tie
/// keeps the earlier-encountered document. Unparseable dates drop out of
/// the comparison. When no group carries a parseable date, or the winning
/// group has no usable URL, the candidates pass through unchanged.
fn most_recent_document(hits: Vec<ScoredChunk<'_>>) -> Vec<ScoredChunk<'_>> {
    let mut order: Vec<Option<&str>> = Vec::new();
    let mut newest: HashMap<Option<&str>, Option<NaiveDate>> = HashMap::new();
    for hit in &hits {
        let url = hit.chunk.meta.url.as_deref();
        let date = parse_filing_date(hit.chunk.meta.filing_date.as_deref());
        match newest.entry(url) {
            Entry::Vacant(entry) => {
                order.push(url);
                entry.insert(date);
            }
            Entry::Occupied(mut entry) => {
                let group_max = entry.get_mut();
                if date > *group_max {
                    *group_max = date;
                }
            }
        }
    }

    let mut winner: Option<(Option<&str>, NaiveDate)> = None;
    for url in &order {
        if let Some(date) = newest[url] {
            // strictly-greater keeps the first-seen group on exact ties
            if winner.map(|(_, best)| date > best).unwrap_or(true) {
                winner = Some((*url, date));
            }
        }
    }

    match winner {
        Some((Some(url), _)) if !url.is_empty() => hits
            .into_iter()
            .filter(|hit| hit.chunk.meta.url.as_deref() == Some(url))
            .collect(),
        _ => hits,
    }
}

/// `None` for missing or unparseable dates; they simply drop out of the
/// recency comparison.
fn parse_filing_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?, "%Y-%m-%d").ok()
}

/// De-duplicated source URLs in order of appearance. Empty URLs are
/// skipped; a repeated URL never consumes a slot.
fn collect_sources(hits: &[ScoredChunk<'_>], cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for hit in hits {
        if sources.len() == cap {
            break;
        }
        if let Some(url) = hit.chunk.meta.url.as_deref() {
            if !url.is_empty() && seen.insert(url) {
                sources.push(url.to_string());
            }
        }
    }
    sources
}
