//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{decode, send, trim_base};
use crate::backend::{GenerateOptions, GenerativeBackend};
use crate::error::{BackendError, Result};

const BACKEND_ID: &str = "gemini";

pub struct GeminiBackend {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

impl GeminiBackend {
    pub const API_KEY_ENV: &'static str = "GEMINI_API_KEY";
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash";

    /// `api_key` falls back to `GEMINI_API_KEY`.
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

/// Concatenated text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn backend_id(&self) -> &str {
        BACKEND_ID
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let generation_config = (options.max_tokens.is_some() || options.temperature.is_some())
            .then(|| GenerationConfig {
                max_output_tokens: options.max_tokens,
                temperature: options.temperature,
            });
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config,
        };
        debug!(model = %self.model, prompt_len = prompt.len(), "gemini request");

        let request = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body);
        let text = send(BACKEND_ID, request, options).await?;

        let parsed: GenerateContentResponse = decode(BACKEND_ID, &text)?;
        Ok(extract_text(parsed))
    }
}
