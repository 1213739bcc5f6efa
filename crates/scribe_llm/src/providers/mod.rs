//! HTTP backend implementations

pub mod gemini;
pub mod ollama;
pub mod openai;

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::backend::GenerateOptions;
use crate::error::{BackendError, Result};

/// Send `request` with the caller's deadline and return the body of a
/// successful response.
pub(crate) async fn send(
    backend: &str,
    mut request: RequestBuilder,
    options: &GenerateOptions,
) -> Result<String> {
    if let Some(timeout) = options.timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|e| transport_error(e, options))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(e, options))?;

    if !status.is_success() {
        return Err(BackendError::Status {
            backend: backend.to_string(),
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(body)
}

pub(crate) fn decode<T: DeserializeOwned>(backend: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| BackendError::decode(backend, e.to_string()))
}

fn transport_error(err: reqwest::Error, options: &GenerateOptions) -> BackendError {
    match options.timeout {
        Some(timeout) if err.is_timeout() => BackendError::Timeout(timeout),
        _ => BackendError::Http(err),
    }
}

fn trim_base(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}
