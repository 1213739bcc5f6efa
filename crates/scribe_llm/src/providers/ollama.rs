//! Ollama backend (self-hosted, localhost:11434 by default).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{decode, send, trim_base};
use crate::backend::{GenerateOptions, GenerativeBackend};
use crate::error::Result;

const BACKEND_ID: &str = "ollama";

pub struct OllamaBackend {
    base_url: String,
    model: String,
    client: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "ModelOptions::is_empty")]
    options: ModelOptions,
}

#[derive(Serialize, Default)]
struct ModelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl ModelOptions {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none()
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaBackend {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";
    pub const DEFAULT_MODEL: &'static str = "llama3.2";

    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            base_url: trim_base(base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string())),
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            client: Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
impl GenerativeBackend for OllamaBackend {
    fn backend_id(&self) -> &str {
        BACKEND_ID
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: ModelOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };
        debug!(model = %self.model, prompt_len = prompt.len(), "ollama request");

        let text = send(BACKEND_ID, self.client.post(&url).json(&body), options).await?;
        let parsed: GenerateResponse = decode(BACKEND_ID, &text)?;
        Ok(parsed.response)
    }
}
