//! Timeout and retry decorator applied at the composition root.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::warn;

use crate::backend::{GenerateOptions, GenerativeBackend};
use crate::error::{BackendError, Result};

const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Wraps a backend with a per-attempt deadline and bounded exponential
/// backoff (base, 2×base, 4×base, ... capped at 10s). Only retryable
/// errors are retried.
pub struct ResilientBackend<B> {
    inner: B,
    attempt_timeout: Option<Duration>,
    max_retries: u32,
    base_delay: Duration,
}

impl<B: GenerativeBackend> ResilientBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            attempt_timeout: None,
            max_retries: 0,
            base_delay: Duration::from_secs(1),
        }
    }

    pub fn with_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = Some(attempt_timeout);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    async fn attempt(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        // The caller's deadline wins over ours when both are set.
        let deadline = match (options.timeout, self.attempt_timeout) {
            (Some(caller), Some(own)) => Some(caller.min(own)),
            (caller, own) => caller.or(own),
        };
        match deadline {
            Some(limit) => timeout(limit, self.inner.generate(prompt, options))
                .await
                .map_err(|_| BackendError::Timeout(limit))?,
            None => self.inner.generate(prompt, options).await,
        }
    }
}

#[async_trait]
impl<B: GenerativeBackend> GenerativeBackend for ResilientBackend<B> {
    fn backend_id(&self) -> &str {
        self.inner.backend_id()
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.backoff(attempt);
                warn!(
                    backend = self.inner.backend_id(),
                    attempt,
                    max_retries = self.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "retrying generation"
                );
                tokio::time::sleep(delay).await;
            }

            match self.attempt(prompt, options).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    warn!(backend = self.inner.backend_id(), error = %e, "generation attempt failed");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
