//! Backend trait and per-call options

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Per-call generation options.
///
/// `timeout` bounds the whole HTTP exchange. `None` leaves the request
/// unbounded; callers normally set it from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub timeout: Option<Duration>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A service that turns a prompt into text.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Stable identifier, e.g. "openai".
    fn backend_id(&self) -> &str;

    /// Generate a completion for `prompt`. The returned text is untrimmed.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String>;
}

#[async_trait]
impl<T: GenerativeBackend + ?Sized> GenerativeBackend for std::sync::Arc<T> {
    fn backend_id(&self) -> &str {
        (**self).backend_id()
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        (**self).generate(prompt, options).await
    }
}
