//! Command dispatch and engine wiring.

pub mod chat;
pub mod connectivity;
pub mod report;
pub mod sessions;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scribe_core::{
    EventRecord, InMemoryMessageStore, JsonDirEventLookup, MessageStore, SqliteMessageStore,
};
use scribe_engine::{EngineConfig, ReportEngine};
use scribe_llm::{
    build_backend, BackendError, BackendKind, GenerateOptions, GenerativeBackend, ResilientBackend,
};
use tracing::{debug, warn};

use crate::cli::{Cli, Command};

pub async fn handle(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.provider.as_deref(), cli.model.as_deref())?;

    match cli.command {
        Command::Report { event, offline } => report::full(&config, &event, offline).await,
        Command::Summary { event } => report::summary(&config, &event).await,
        Command::Recommendations { event } => report::recommendations(&config, &event).await,
        Command::Block {
            block_type,
            context,
        } => report::block(&config, &block_type, &context).await,
        Command::Chat {
            owner,
            session,
            message,
            report_context,
        } => chat::handle(&config, owner, session, message, report_context).await,
        Command::Sessions { action } => sessions::handle(&config, action).await,
        Command::Connectivity => connectivity::handle(&config).await,
    }
}

/// Environment configuration with command-line overrides applied.
fn resolve_config(provider: Option<&str>, model: Option<&str>) -> Result<EngineConfig> {
    let mut config = EngineConfig::from_env();
    if let Some(provider) = provider {
        config.provider = provider.parse::<BackendKind>()?;
    }
    if let Some(model) = model {
        config = config.with_model(model);
    }
    Ok(config)
}

/// Configured backend behind the timeout/retry decorator.
fn backend(config: &EngineConfig) -> Result<Arc<dyn GenerativeBackend>> {
    let inner = build_backend(&config.backend_spec())
        .with_context(|| format!("cannot build {} backend", config.provider))?;
    debug!(
        backend = inner.backend_id(),
        model = config.effective_model(),
        "backend ready"
    );
    Ok(Arc::new(
        ResilientBackend::new(inner)
            .with_timeout(config.timeout)
            .with_max_retries(config.max_retries),
    ))
}

/// Engine for one-shot generation commands; chat history is not touched.
pub(crate) fn generation_engine(config: &EngineConfig) -> Result<ReportEngine> {
    let store: Arc<dyn MessageStore> = Arc::new(InMemoryMessageStore::new());
    Ok(ReportEngine::builder(backend(config)?, store)
        .config(config)
        .build())
}

/// Stands in for a backend that could not be built. Every call fails, so the
/// report path renders the template report instead of aborting.
struct UnbuiltBackend {
    kind: BackendKind,
    reason: String,
}

#[async_trait]
impl GenerativeBackend for UnbuiltBackend {
    fn backend_id(&self) -> &str {
        self.kind.as_str()
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> scribe_llm::Result<String> {
        Err(BackendError::Other(format!(
            "{} backend unavailable: {}",
            self.kind, self.reason
        )))
    }
}

/// Engine for `scribe report`, which must produce a document even when the
/// backend cannot be configured.
pub(crate) fn report_engine(config: &EngineConfig) -> ReportEngine {
    report_engine_from(config, backend(config))
}

fn report_engine_from(
    config: &EngineConfig,
    built: Result<Arc<dyn GenerativeBackend>>,
) -> ReportEngine {
    let backend = built.unwrap_or_else(|e| {
        let reason = format!("{e:#}");
        warn!(error = %reason, "backend not available, report will use the template");
        Arc::new(UnbuiltBackend {
            kind: config.provider,
            reason,
        })
    });
    let store: Arc<dyn MessageStore> = Arc::new(InMemoryMessageStore::new());
    ReportEngine::builder(backend, store).config(config).build()
}

/// Engine backed by the on-disk chat store and, when configured, the event directory.
pub(crate) fn chat_engine(config: &EngineConfig) -> Result<ReportEngine> {
    let store: Arc<dyn MessageStore> = Arc::new(
        SqliteMessageStore::open(&config.db_path)
            .with_context(|| format!("cannot open chat store {}", config.db_path.display()))?,
    );
    let mut builder = ReportEngine::builder(backend(config)?, store).config(config);
    if let Some(dir) = &config.events_dir {
        builder = builder.event_lookup(Arc::new(JsonDirEventLookup::new(dir)));
    }
    Ok(builder.build())
}

pub(crate) fn load_event(path: &Path) -> Result<EventRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read event record {}", path.display()))?;
    EventRecord::from_json(&raw).with_context(|| format!("invalid event record {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{"title": "Robotics Expo", "startDate": "2024-05-02", "endDate": "2024-05-03"}"#,
        )
        .unwrap();

        let event = load_event(&path).unwrap();
        assert_eq!(event.title, "Robotics Expo");
    }

    #[test]
    fn test_load_event_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{}").unwrap();

        let err = load_event(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn test_resolve_config_rejects_unknown_provider() {
        assert!(resolve_config(Some("carrier-pigeon"), None).is_err());
    }

    #[tokio::test]
    async fn test_report_engine_falls_back_when_backend_cannot_be_built() {
        let config = EngineConfig::new().with_provider(BackendKind::OpenAi);
        let built = Err(anyhow::Error::new(BackendError::MissingApiKey(
            "openai".to_string(),
        )));
        let engine = report_engine_from(&config, built);
        assert_eq!(engine.generation().backend_id(), "openai");

        let event = EventRecord::from_json(
            r#"{"title": "AI Workshop", "startDate": "2024-01-10", "endDate": "2024-01-11", "participantCount": 120}"#,
        )
        .unwrap();
        let report = engine.generate_full_report(&event).await;
        assert!(report.text.starts_with("# AI WORKSHOP"));
        assert!(report.text.contains("two-day"));
        assert!(report.text.contains("120"));
    }

    #[tokio::test]
    async fn test_unbuilt_backend_always_fails() {
        let backend = UnbuiltBackend {
            kind: BackendKind::Gemini,
            reason: "missing API key".to_string(),
        };
        let err = backend
            .generate("hello", &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("gemini backend unavailable: missing API key"));
    }

    #[test]
    fn test_generation_engine_builds_for_ollama() {
        let config = EngineConfig::new().with_provider(BackendKind::Ollama);
        assert!(generation_engine(&config).is_ok());
    }
}
