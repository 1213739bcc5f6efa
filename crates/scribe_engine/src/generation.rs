//! Backend orchestration with a template fallback for full reports.

use std::sync::Arc;
use std::time::{Duration, Instant};

use scribe_core::{BlockKind, EventRecord};
use scribe_llm::{BackendError, GenerateOptions, GenerativeBackend};
use scribe_observability::{generation_span, record_duration, record_error};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument, Span};

use crate::clock::{Clock, SystemClock};
use crate::error::GenerationError;
use crate::fallback::build_fallback_report;
use crate::prompt::{
    build_block_prompt, build_recommendations_prompt, build_report_prompt, build_summary_prompt,
    CONNECTIVITY_MARKER, CONNECTIVITY_PROMPT,
};

/// Lifecycle of one generation call.
///
/// `Idle → PromptBuilt → BackendInFlight → Success | BackendFailed`, then
/// `BackendFailed → FallbackBuilt → Success` for full reports and
/// `BackendFailed → Failure` for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Idle,
    PromptBuilt,
    BackendInFlight,
    BackendFailed,
    FallbackBuilt,
    Success,
    Failure,
}

impl GenerationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationPhase::Idle => "idle",
            GenerationPhase::PromptBuilt => "prompt_built",
            GenerationPhase::BackendInFlight => "backend_in_flight",
            GenerationPhase::BackendFailed => "backend_failed",
            GenerationPhase::FallbackBuilt => "fallback_built",
            GenerationPhase::Success => "success",
            GenerationPhase::Failure => "failure",
        }
    }
}

/// Backend text plus the time spent waiting for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatGeneration {
    pub text: String,
    pub latency: Duration,
}

#[derive(Debug, Error)]
enum Failed {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("empty response")]
    Empty,
    #[error("cancelled")]
    Cancelled,
}

impl Failed {
    fn into_error(self, operation: &'static str, block_type: Option<String>) -> GenerationError {
        match self {
            Failed::Backend(e) => GenerationError::Backend {
                operation,
                block_type,
                message: e.to_string(),
            },
            Failed::Empty => GenerationError::EmptyResponse { operation },
            Failed::Cancelled => GenerationError::Cancelled,
        }
    }
}

/// Per-call phase tracker; every transition is a debug event.
struct Run {
    operation: &'static str,
    phase: GenerationPhase,
}

impl Run {
    fn start(operation: &'static str) -> Self {
        Self {
            operation,
            phase: GenerationPhase::Idle,
        }
    }

    fn advance(&mut self, next: GenerationPhase) {
        debug!(
            operation = self.operation,
            from = self.phase.as_str(),
            to = next.as_str(),
            "generation phase"
        );
        self.phase = next;
    }
}

pub struct ContentGenerationService {
    backend: Arc<dyn GenerativeBackend>,
    clock: Arc<dyn Clock>,
    options: GenerateOptions,
}

impl ContentGenerationService {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            options: GenerateOptions::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Options forwarded on every backend call (timeout, token cap).
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend_id(&self) -> &str {
        self.backend.backend_id()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Dispatch `prompt` and wait for a non-blank reply.
    async fn invoke(
        &self,
        run: &mut Run,
        prompt: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<ChatGeneration, Failed> {
        Span::current().record("backend", self.backend.backend_id());
        run.advance(GenerationPhase::BackendInFlight);

        let started = Instant::now();
        let call = self.backend.generate(prompt, &self.options);
        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(Failed::Cancelled),
                r = call => r.map_err(Failed::from),
            },
            None => call.await.map_err(Failed::from),
        };
        let latency = started.elapsed();
        record_duration("duration_ms", latency);

        let outcome = result.and_then(|raw| {
            let text = raw.trim();
            if text.is_empty() {
                Err(Failed::Empty)
            } else {
                Ok(ChatGeneration {
                    text: text.to_string(),
                    latency,
                })
            }
        });
        match &outcome {
            Ok(_) => run.advance(GenerationPhase::Success),
            Err(_) => run.advance(GenerationPhase::BackendFailed),
        }
        outcome
    }

    /// Non-report path: failures surface as `GenerationError`.
    async fn generate_strict(
        &self,
        operation: &'static str,
        block_type: Option<String>,
        prompt: String,
        cancel: Option<&CancellationToken>,
    ) -> Result<ChatGeneration, GenerationError> {
        let mut run = Run::start(operation);
        run.advance(GenerationPhase::PromptBuilt);

        match self.invoke(&mut run, &prompt, cancel).await {
            Ok(generation) => Ok(generation),
            Err(failure) => {
                run.advance(GenerationPhase::Failure);
                let err = failure.into_error(operation, block_type);
                record_error(&err);
                Err(err)
            }
        }
    }

    /// Full report. Backend failures and blank replies are replaced by the
    /// fallback document, so this never fails.
    pub async fn generate_report_content(&self, event: &EventRecord) -> String {
        async {
            let today = self.clock.today();
            let mut run = Run::start("report");
            let prompt = build_report_prompt(event, today);
            run.advance(GenerationPhase::PromptBuilt);

            match self.invoke(&mut run, &prompt, None).await {
                Ok(generation) => generation.text,
                Err(failure) => {
                    warn!(
                        title = %event.title,
                        error = %failure,
                        "report generation failed, using fallback template"
                    );
                    Span::current().record("fallback", true);
                    let report = build_fallback_report(event, today);
                    run.advance(GenerationPhase::FallbackBuilt);
                    run.advance(GenerationPhase::Success);
                    report
                }
            }
        }
        .instrument(generation_span!("report"))
        .await
    }

    pub async fn generate_event_summary(
        &self,
        event: &EventRecord,
    ) -> Result<String, GenerationError> {
        let prompt = build_summary_prompt(event, self.clock.today());
        self.generate_strict("summary", None, prompt, None)
            .instrument(generation_span!("summary"))
            .await
            .map(|g| g.text)
    }

    pub async fn generate_recommendations(
        &self,
        event: &EventRecord,
    ) -> Result<String, GenerationError> {
        let prompt = build_recommendations_prompt(event, self.clock.today());
        self.generate_strict("recommendations", None, prompt, None)
            .instrument(generation_span!("recommendations"))
            .await
            .map(|g| g.text)
    }

    pub async fn generate_block_content(
        &self,
        kind: &BlockKind,
        context: &str,
    ) -> Result<String, GenerationError> {
        let prompt = build_block_prompt(kind, context);
        self.generate_strict("block content", Some(kind.to_string()), prompt, None)
            .instrument(generation_span!("block"))
            .await
            .map(|g| g.text)
    }

    /// Chat reply for an already-built prompt. Cancelling `cancel` aborts
    /// the backend call with `GenerationError::Cancelled`.
    pub async fn generate_chat_reply(
        &self,
        prompt: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<ChatGeneration, GenerationError> {
        self.generate_strict("chat", None, prompt.to_string(), cancel)
            .instrument(generation_span!("chat"))
            .await
    }

    /// Sends a probe prompt; true only if the reply contains the marker.
    pub async fn test_backend_connectivity(&self) -> bool {
        let span = generation_span!("connectivity");
        async {
            match self.backend.generate(CONNECTIVITY_PROMPT, &self.options).await {
                Ok(reply) => {
                    let connected = reply.contains(CONNECTIVITY_MARKER);
                    if !connected {
                        warn!(backend = self.backend.backend_id(), "probe reply missing marker");
                    }
                    connected
                }
                Err(e) => {
                    warn!(backend = self.backend.backend_id(), error = %e, "connectivity probe failed");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }
}
