use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::AssistantConfig;
use crate::errors::{CoreError, CoreResult};
use crate::types::*;

/// A text-completion backend. Stateless from the caller's point of view:
/// one prompt in, one generated text out, no retry.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> CoreResult<String>;
}

/// Computes embedding vectors for a batch of texts.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>>;
}

/// Client for an OpenAI-compatible chat-completions and embeddings API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(config: &AssistantConfig) -> CoreResult<Self> {
        let api_key = config.resolve_api_key()?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
        })
    }

    async fn post_json<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        request: &Req,
    ) -> CoreResult<Resp> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CoreError::RequestError(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.map_err(|e| {
                CoreError::ResponseError(format!("Failed to read error response: {}", e))
            })?;
            return Err(CoreError::HttpError {
                status_code: status.as_u16(),
                message: format!("API request failed: {}", error_body),
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| CoreError::ParsingError(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl LlmBackend for OpenAiClient {
    async fn complete(&self, prompt: &str) -> CoreResult<String> {
        debug!(prompt_len = prompt.len(), model = %self.chat_model, "Sending completion request");

        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: Some(self.temperature),
        };

        let response: ChatResponse = self.post_json("chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CoreError::ResponseError("No choices in response".to_string()))
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        debug!(count = texts.len(), model = %self.embedding_model, "Sending embedding request");

        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            input: texts.to_vec(),
        };

        let response: EmbeddingResponse = self.post_json("embeddings", &request).await?;

        if response.data.len() != texts.len() {
            return Err(CoreError::ResponseError(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}
