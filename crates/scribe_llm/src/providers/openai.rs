//! OpenAI Chat Completions backend (api.openai.com or any compatible server).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{decode, send, trim_base};
use crate::backend::{GenerateOptions, GenerativeBackend};
use crate::error::{BackendError, Result};

const BACKEND_ID: &str = "openai";

pub struct OpenAiBackend {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessageOut<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessageOut<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl OpenAiBackend {
    pub const API_KEY_ENV: &'static str = "OPENAI_API_KEY";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// `api_key` falls back to `OPENAI_API_KEY`.
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self> {
        let api_key = api_key
            .or_else(|| std::env::var(Self::API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| BackendError::MissingApiKey(BACKEND_ID.to_string()))?;
        Ok(Self {
            base_url: trim_base(base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string())),
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            api_key,
            client: Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerativeBackend for OpenAiBackend {
    fn backend_id(&self) -> &str {
        BACKEND_ID
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessageOut {
                role: "user",
                content: prompt,
            }],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };
        debug!(model = %self.model, prompt_len = prompt.len(), "openai request");

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);
        let text = send(BACKEND_ID, request, options).await?;

        let parsed: ChatResponse = decode(BACKEND_ID, &text)?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_missing_key_is_rejected() {
        let result = OpenAiBackend::new(Some(String::new()), None, None);
        assert!(matches!(result, Err(BackendError::MissingApiKey(_))));
    }

    #[tokio::test]
    async fn test_generate_reads_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-test",
                "messages": [{"role": "user", "content": "Write a summary"}],
                "max_tokens": 128
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"A summary."}}]}"#)
            .create_async()
            .await;

        let backend = OpenAiBackend::new(
            Some("sk-test".to_string()),
            Some(format!("{}/", server.url())),
            Some("gpt-test".to_string()),
        )
        .unwrap();
        let options = GenerateOptions::new().with_max_tokens(128);
        let text = backend.generate("Write a summary", &options).await.unwrap();

        assert_eq!(text, "A summary.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_maps_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let backend =
            OpenAiBackend::new(Some("sk-test".to_string()), Some(server.url()), None).unwrap();
        let err = backend
            .generate("hi", &GenerateOptions::default())
            .await
            .unwrap_err();

        match err {
            BackendError::Status { status, message, .. } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_yield_empty_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let backend =
            OpenAiBackend::new(Some("sk-test".to_string()), Some(server.url()), None).unwrap();
        let text = backend
            .generate("hi", &GenerateOptions::default())
            .await
            .unwrap();
        assert!(text.is_empty());
    }
}
