//! Engine configuration

use std::path::PathBuf;
use std::time::Duration;

use scribe_llm::{BackendKind, BackendSpec, GenerateOptions, GeminiBackend, OpenAiBackend};

pub const DEFAULT_HISTORY_WINDOW: usize = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Generative backend family
    pub provider: BackendKind,
    /// Model override (None = backend default)
    pub model: Option<String>,
    /// Base URL override for self-hosted or proxied backends
    pub base_url: Option<String>,
    /// Per-request deadline handed to the backend
    pub timeout: Duration,
    /// Retries applied by the `ResilientBackend` decorator
    pub max_retries: u32,
    /// Exchanges of chat history included in a prompt (turns = 2 × window)
    pub history_window: usize,
    /// Response length cap passed to the backend
    pub max_tokens: Option<u32>,
    /// SQLite file holding chat turns
    pub db_path: PathBuf,
    /// Directory of `<id>.json` event records used as chat report context
    pub events_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            provider: BackendKind::default(),
            model: None,
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 0,
            history_window: DEFAULT_HISTORY_WINDOW,
            max_tokens: None,
            db_path: Self::default_data_dir().join(scribe_core::store::DATA_DB),
            events_dir: None,
        }
    }

    /// `~/.scribe`, or `./.scribe` when no home directory is known.
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".scribe")
    }

    pub fn with_provider(mut self, provider: BackendKind) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window.max(1);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_events_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.events_dir = Some(dir.into());
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::new();

        match var("SCRIBE_PROVIDER") {
            Some(name) => match name.parse::<BackendKind>() {
                Ok(provider) => config.provider = provider,
                Err(e) => tracing::warn!(error = %e, "ignoring SCRIBE_PROVIDER"),
            },
            // No explicit provider: infer from whichever API key is present.
            None => {
                if var(OpenAiBackend::API_KEY_ENV).is_some() {
                    config.provider = BackendKind::OpenAi;
                } else if var(GeminiBackend::API_KEY_ENV).is_some() {
                    config.provider = BackendKind::Gemini;
                } else {
                    config.provider = BackendKind::Ollama;
                }
            }
        }

        config.model = var("SCRIBE_MODEL");
        config.base_url = var("SCRIBE_BASE_URL");

        if let Some(secs) = var("SCRIBE_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(retries) = var("SCRIBE_MAX_RETRIES").and_then(|v| v.parse::<u32>().ok()) {
            config.max_retries = retries;
        }

        if let Some(window) = var("SCRIBE_HISTORY_WINDOW").and_then(|v| v.parse::<usize>().ok()) {
            config = config.with_history_window(window);
        }

        if let Some(max_tokens) = var("SCRIBE_MAX_TOKENS").and_then(|v| v.parse::<u32>().ok()) {
            config.max_tokens = Some(max_tokens);
        }

        if let Some(path) = var("SCRIBE_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        config.events_dir = var("SCRIBE_EVENTS_DIR").map(PathBuf::from);

        config
    }

    /// Backend description for [`scribe_llm::build_backend`].
    pub fn backend_spec(&self) -> BackendSpec {
        BackendSpec {
            kind: self.provider,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            api_key: None,
        }
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            timeout: Some(self.timeout),
            max_tokens: self.max_tokens,
            temperature: None,
        }
    }

    /// Model name actually used, for display.
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.history_window, 5);
        assert_eq!(config.max_retries, 0);
        assert!(config.db_path.ends_with(".scribe/scribe.db"));
    }

    #[test]
    fn test_explicit_provider_wins() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("SCRIBE_PROVIDER", "gemini"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SCRIBE_MODEL", "gemini-2.0-flash"),
        ]));
        assert_eq!(config.provider, BackendKind::Gemini);
        assert_eq!(config.effective_model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_provider_inferred_from_api_key() {
        let config = EngineConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "g")]));
        assert_eq!(config.provider, BackendKind::Gemini);

        let config = EngineConfig::from_lookup(lookup(&[]));
        assert_eq!(config.provider, BackendKind::Ollama);
        assert_eq!(config.effective_model(), "llama3.2");
    }

    #[test]
    fn test_numeric_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("SCRIBE_TIMEOUT_SECS", "15"),
            ("SCRIBE_MAX_RETRIES", "2"),
            ("SCRIBE_HISTORY_WINDOW", "0"),
            ("SCRIBE_MAX_TOKENS", "not-a-number"),
            ("SCRIBE_DB_PATH", "/tmp/chat.db"),
        ]));
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.history_window, 1);
        assert_eq!(config.max_tokens, None);
        assert_eq!(config.db_path, PathBuf::from("/tmp/chat.db"));
    }

    #[test]
    fn test_generate_options_carry_timeout() {
        let options = EngineConfig::new()
            .with_timeout(Duration::from_secs(9))
            .generate_options();
        assert_eq!(options.timeout, Some(Duration::from_secs(9)));
    }
}
