// src/openai/client.rs
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::openai::models::{
    ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse,
};
use crate::utils::error::OpenAiError;

/// Texts per embeddings request, kept under the API's request-size limits.
pub const EMBED_BATCH_SIZE: usize = 64;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const CHAT_TEMPERATURE: f32 = 0.2;

/// Minimal OpenAI REST client covering the two endpoints the pipeline
/// needs: embeddings and chat completions. Batches are issued and awaited
/// sequentially by callers; the first failure propagates.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str) -> Result<Self, OpenAiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, OpenAiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAiError::Http { status, body });
        }

        Ok(response.json().await?)
    }

    /// Embeds one batch of texts, preserving input order.
    pub async fn embed_batch(
        &self,
        texts: &[String],
        model: &str,
    ) -> Result<Vec<Vec<f32>>, OpenAiError> {
        let request = EmbeddingRequest { model, input: texts };
        let response: EmbeddingResponse = self.post("/embeddings", &request).await?;

        if response.data.len() != texts.len() {
            return Err(OpenAiError::CountMismatch {
                sent: texts.len(),
                got: response.data.len(),
            });
        }
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Embeds a single query string.
    pub async fn embed_query(&self, text: &str, model: &str) -> Result<Vec<f32>, OpenAiError> {
        let input = [text.to_string()];
        let mut vectors = self.embed_batch(&input, model).await?;
        vectors.pop().ok_or(OpenAiError::CountMismatch { sent: 1, got: 0 })
    }

    /// One-shot chat completion with a system and a user prompt.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> Result<String, OpenAiError> {
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
            temperature: CHAT_TEMPERATURE,
        };
        let response: ChatResponse = self.post("/chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(OpenAiError::EmptyCompletion)
    }
}
