// src/rag/answer.rs
use crate::openai::OpenAiClient;
use crate::rag::engine::ScoredChunk;
use crate::utils::error::OpenAiError;

pub const SYSTEM_PROMPT: &str =
    "Be concise. Use bullet points. Prefer concrete facts with dates.";

/// Rendered when filtering eliminates every candidate. The model is never
/// asked to answer from nothing.
pub const NO_MATCH_MESSAGE: &str = "No matching documents found after filtering.";

/// Formats one chunk as a grounding block: a source tag followed by the
/// chunk text.
fn context_block(hit: &ScoredChunk<'_>) -> String {
    let meta = &hit.chunk.meta;
    format!(
        "[{} | {} | {}] {}",
        meta.ticker.as_deref().unwrap_or("?"),
        meta.doc_type.as_deref().unwrap_or("?"),
        meta.filing_date.as_deref().unwrap_or("?"),
        hit.chunk.text
    )
}

/// Joins the selected chunks into the grounding context.
pub fn build_context(hits: &[ScoredChunk<'_>]) -> String {
    hits.iter()
        .map(context_block)
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

pub fn build_user_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a financial market analyst assistant.\n\
         Answer the user's question using ONLY the provided context.\n\
         If the answer is not in the context, say what is missing (e.g., \"the filing text doesn't include the disclosure section\").\n\
         \n\
         Question: {question}\n\
         \n\
         Context:\n{context}\n"
    )
}

/// Sends the grounded prompt to the chat model and returns its answer.
/// Callers must not invoke this with an empty hit list.
pub async fn synthesize(
    client: &OpenAiClient,
    question: &str,
    hits: &[ScoredChunk<'_>],
    model: &str,
) -> Result<String, OpenAiError> {
    let context = build_context(hits);
    let prompt = build_user_prompt(question, &context);
    client.complete(SYSTEM_PROMPT, &prompt, model).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{ChunkMeta, ChunkRecord};

    fn record(ticker: Option<&str>, date: Option<&str>, text: &str) -> ChunkRecord {
        ChunkRecord {
            chunk_id: "doc::chunk_0".to_string(),
            text: text.to_string(),
            meta: ChunkMeta {
                id: "doc".to_string(),
                ticker: ticker.map(str::to_string),
                doc_type: Some("8-K".to_string()),
                filing_date: date.map(str::to_string),
                url: Some("https://example.com/doc.htm".to_string()),
                source: Some("SEC_EDGAR".to_string()),
            },
        }
    }

    #[test]
    fn context_blocks_carry_source_tags() {
        let a = record(Some("AAPL"), Some("2024-08-01"), "Apple reported revenue.");
        let b = record(Some("MSFT"), None, "Microsoft filed an 8-K.");
        let hits = vec![
            ScoredChunk { score: 0.9, chunk: &a },
            ScoredChunk { score: 0.8, chunk: &b },
        ];

        let context = build_context(&hits);
        assert!(context.contains("[AAPL | 8-K | 2024-08-01] Apple reported revenue."));
        assert!(context.contains("[MSFT | 8-K | ?] Microsoft filed an 8-K."));
        assert_eq!(context.matches("\n\n---\n\n").count(), 1);
    }

    #[test]
    fn user_prompt_embeds_question_and_context() {
        let prompt = build_user_prompt("What changed?", "some context");
        assert!(prompt.contains("Question: What changed?"));
        assert!(prompt.contains("Context:\nsome context"));
        assert!(prompt.contains("ONLY the provided context"));
    }
}
