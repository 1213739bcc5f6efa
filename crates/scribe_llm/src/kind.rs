//! Backend selection

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::backend::GenerativeBackend;
use crate::error::{BackendError, Result};
use crate::providers::{GeminiBackend, OllamaBackend, OpenAiBackend};

/// Supported backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    OpenAi,
    Ollama,
    Gemini,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Ollama => "ollama",
            BackendKind::Gemini => "gemini",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => OpenAiBackend::DEFAULT_MODEL,
            BackendKind::Ollama => OllamaBackend::DEFAULT_MODEL,
            BackendKind::Gemini => GeminiBackend::DEFAULT_MODEL,
        }
    }

    /// Environment variable holding the API key, if the backend needs one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            BackendKind::OpenAi => Some(OpenAiBackend::API_KEY_ENV),
            BackendKind::Ollama => None,
            BackendKind::Gemini => Some(GeminiBackend::API_KEY_ENV),
        }
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "ollama" => Ok(BackendKind::Ollama),
            "gemini" | "google" => Ok(BackendKind::Gemini),
            other => Err(BackendError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to build: kind plus optional overrides. Unset fields use the
/// backend's defaults (and its API key env var).
#[derive(Debug, Clone, Default)]
pub struct BackendSpec {
    pub kind: BackendKind,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl BackendSpec {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Construct the backend described by `spec`.
pub fn build_backend(spec: &BackendSpec) -> Result<Arc<dyn GenerativeBackend>> {
    let backend: Arc<dyn GenerativeBackend> = match spec.kind {
        BackendKind::OpenAi => Arc::new(OpenAiBackend::new(
            spec.api_key.clone(),
            spec.base_url.clone(),
            spec.model.clone(),
        )?),
        BackendKind::Ollama => Arc::new(OllamaBackend::new(
            spec.base_url.clone(),
            spec.model.clone(),
        )),
        BackendKind::Gemini => Arc::new(GeminiBackend::new(
            spec.api_key.clone(),
            spec.base_url.clone(),
            spec.model.clone(),
        )?),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert_eq!(" Ollama ".parse::<BackendKind>().unwrap(), BackendKind::Ollama);
        assert_eq!("google".parse::<BackendKind>().unwrap(), BackendKind::Gemini);
        assert!("claude".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_display_roundtrips() {
        for kind in [BackendKind::OpenAi, BackendKind::Ollama, BackendKind::Gemini] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_build_ollama_needs_no_key() {
        let backend = build_backend(&BackendSpec::new(BackendKind::Ollama)).unwrap();
        assert_eq!(backend.backend_id(), "ollama");
    }

    #[test]
    fn test_build_openai_with_explicit_key() {
        let spec = BackendSpec::new(BackendKind::OpenAi)
            .with_api_key("sk-test")
            .with_model("gpt-test");
        let backend = build_backend(&spec).unwrap();
        assert_eq!(backend.backend_id(), "openai");
    }
}
