// tests/retrieval_integration.rs
//
// End-to-end retrieval over a persisted index and metadata store: build,
// save, reload, query, filter.

use sec_analyst::chunking::{ChunkMeta, ChunkRecord};
use sec_analyst::index::{l2_normalize, l2_normalize_all, FlatIndex, MetaStore};
use sec_analyst::rag::{retrieve, RetrievalOptions, RetrievalOutcome};

fn chunk(
    chunk_id: &str,
    ticker: &str,
    doc_type: &str,
    filing_date: Option<&str>,
    url: &str,
    text: &str,
) -> ChunkRecord {
    ChunkRecord {
        chunk_id: chunk_id.to_string(),
        text: text.to_string(),
        meta: ChunkMeta {
            id: chunk_id.split("::").next().unwrap().to_string(),
            ticker: Some(ticker.to_string()),
            doc_type: Some(doc_type.to_string()),
            filing_date: filing_date.map(str::to_string),
            url: Some(url.to_string()),
            source: Some("SEC_EDGAR".to_string()),
        },
    }
}

/// A small corpus: two AAPL 8-Ks (one newer), one MSFT 10-Q.
fn corpus() -> (Vec<ChunkRecord>, Vec<Vec<f32>>) {
    let records = vec![
        chunk(
            "aapl_old::chunk_0",
            "AAPL",
            "8-K",
            Some("2024-01-15"),
            "https://sec.example/aapl_old.htm",
            "Apple announced a dividend.",
        ),
        chunk(
            "aapl_new::chunk_0",
            "AAPL",
            "8-K",
            Some("2024-06-30"),
            "https://sec.example/aapl_new.htm",
            "Apple reported quarterly revenue.",
        ),
        chunk(
            "aapl_new::chunk_1",
            "AAPL",
            "8-K",
            Some("2024-06-30"),
            "https://sec.example/aapl_new.htm",
            "Apple commented on supply chains.",
        ),
        chunk(
            "msft_q::chunk_0",
            "MSFT",
            "10-Q",
            Some("2024-05-01"),
            "https://sec.example/msft_q.htm",
            "Microsoft cloud segment grew.",
        ),
    ];
    let vectors = vec![
        vec![0.9, 0.1, 0.0],
        vec![0.8, 0.3, 0.0],
        vec![0.7, 0.1, 0.2],
        vec![0.1, 0.9, 0.1],
    ];
    (records, vectors)
}

fn build_on_disk(dir: &std::path::Path) -> (FlatIndex, MetaStore) {
    let (records, mut vectors) = corpus();
    l2_normalize_all(&mut vectors);

    let mut index = FlatIndex::new(3);
    index.add(vectors).unwrap();
    let store = MetaStore::new(records);

    let index_path = dir.join("sec.index");
    let meta_path = dir.join("sec_meta.json");
    index.save(&index_path).unwrap();
    store.save(&meta_path).unwrap();

    // the query path starts from the persisted files
    (
        FlatIndex::load(&index_path).unwrap(),
        MetaStore::load(&meta_path).unwrap(),
    )
}

fn query() -> Vec<f32> {
    let mut q = vec![1.0, 0.2, 0.0];
    l2_normalize(&mut q);
    q
}

#[test]
fn persisted_index_and_store_stay_position_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let (index, store) = build_on_disk(dir.path());
    assert_eq!(index.ntotal(), store.len());

    let outcome = retrieve(&index, &store, &query(), &RetrievalOptions::default()).unwrap();
    let RetrievalOutcome::Hits { chunks, .. } = outcome else {
        panic!("expected hits");
    };
    // every chunk resolves and scores are descending
    assert_eq!(chunks.len(), 4);
    for pair in chunks.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn ticker_and_doc_type_filters_compose() {
    let dir = tempfile::tempdir().unwrap();
    let (index, store) = build_on_disk(dir.path());

    let options = RetrievalOptions {
        ticker: Some("aapl".to_string()),
        doc_type: Some("8-k".to_string()),
        ..Default::default()
    };
    let outcome = retrieve(&index, &store, &query(), &options).unwrap();
    let RetrievalOutcome::Hits { chunks, .. } = outcome else {
        panic!("expected hits");
    };
    assert_eq!(chunks.len(), 3);
    for hit in &chunks {
        assert!(hit.chunk.meta.ticker.as_deref().unwrap().eq_ignore_ascii_case("AAPL"));
        assert!(hit.chunk.meta.doc_type.as_deref().unwrap().eq_ignore_ascii_case("8-K"));
    }
}

#[test]
fn most_recent_narrows_to_one_document_after_filtering() {
    let dir = tempfile::tempdir().unwrap();
    let (index, store) = build_on_disk(dir.path());

    let options = RetrievalOptions {
        ticker: Some("AAPL".to_string()),
        most_recent: true,
        ..Default::default()
    };
    let outcome = retrieve(&index, &store, &query(), &options).unwrap();
    let RetrievalOutcome::Hits { chunks, sources } = outcome else {
        panic!("expected hits");
    };

    // only the newer AAPL filing survives, both of its chunks, one source
    assert_eq!(chunks.len(), 2);
    for hit in &chunks {
        assert_eq!(
            hit.chunk.meta.url.as_deref(),
            Some("https://sec.example/aapl_new.htm")
        );
    }
    assert_eq!(sources, vec!["https://sec.example/aapl_new.htm"]);
}

#[test]
fn unmatched_filter_returns_the_empty_marker() {
    let dir = tempfile::tempdir().unwrap();
    let (index, store) = build_on_disk(dir.path());

    let options = RetrievalOptions {
        ticker: Some("TSLA".to_string()),
        ..Default::default()
    };
    let outcome = retrieve(&index, &store, &query(), &options).unwrap();
    assert!(matches!(outcome, RetrievalOutcome::Empty));
}

#[test]
fn max_chunks_bounds_the_context() {
    let dir = tempfile::tempdir().unwrap();
    let (index, store) = build_on_disk(dir.path());

    let options = RetrievalOptions {
        max_chunks: 2,
        ..Default::default()
    };
    let outcome = retrieve(&index, &store, &query(), &options).unwrap();
    let RetrievalOutcome::Hits { chunks, .. } = outcome else {
        panic!("expected hits");
    };
    assert_eq!(chunks.len(), 2);
}

#[test]
fn k_larger_than_corpus_is_harmless() {
    let dir = tempfile::tempdir().unwrap();
    let (index, store) = build_on_disk(dir.path());

    // the index pads with negative-position sentinels which must be dropped
    let options = RetrievalOptions {
        k: 100,
        ..Default::default()
    };
    let outcome = retrieve(&index, &store, &query(), &options).unwrap();
    let RetrievalOutcome::Hits { chunks, .. } = outcome else {
        panic!("expected hits");
    };
    assert_eq!(chunks.len(), 4);
}
