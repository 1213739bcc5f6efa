//! Subscriber installation and OTLP export (OpenTelemetry 0.31)

use once_cell::sync::OnceCell;
use opentelemetry::{global, trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::ObservabilityConfig;
use crate::error::ObservabilityError;

// Kept for flushing on shutdown
static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    config
        .log_level
        .as_deref()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
}

/// Install the global subscriber.
///
/// An OTLP endpoint that fails to build downgrades to console-only logging
/// with a warning. Calling this twice returns `AlreadyInitialized`.
pub fn init(config: ObservabilityConfig) -> Result<(), ObservabilityError> {
    let filter = env_filter(&config);

    let fmt_layer = config.enable_console.then(|| {
        let writer = if config.log_to_stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::stdout)
        };
        tracing_subscriber::fmt::layer().with_writer(writer)
    });

    let mut otlp_error = None;
    let otel_layer = match &config.otlp_endpoint {
        Some(endpoint) => match build_otlp_tracer_provider(&config, endpoint) {
            Ok((tracer, provider)) => {
                global::set_tracer_provider(provider.clone());
                let _ = TRACER_PROVIDER.set(provider);
                Some(OpenTelemetryLayer::new(tracer))
            }
            Err(e) => {
                otlp_error = Some(e);
                None
            }
        },
        None => None,
    };
    let otlp_enabled = otel_layer.is_some();

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| ObservabilityError::AlreadyInitialized(e.to_string()))?;

    // Logged after install so the lines are not lost.
    match (&config.otlp_endpoint, otlp_error) {
        (Some(endpoint), Some(e)) => tracing::warn!(
            service.name = %config.service_name,
            otlp.endpoint = %endpoint,
            error = %e,
            "OTLP export unavailable, logging to console only"
        ),
        (Some(endpoint), None) if otlp_enabled => tracing::debug!(
            service.name = %config.service_name,
            otlp.endpoint = %endpoint,
            "OTLP tracing enabled"
        ),
        _ => tracing::debug!(service.name = %config.service_name, "tracing initialized"),
    }

    Ok(())
}

fn build_otlp_tracer_provider(
    config: &ObservabilityConfig,
    endpoint: &str,
) -> Result<(SdkTracer, SdkTracerProvider), ObservabilityError> {
    let mut attributes = vec![KeyValue::new("service.name", config.service_name.clone())];
    if let Some(version) = &config.service_version {
        attributes.push(KeyValue::new("service.version", version.clone()));
    }
    for (key, value) in &config.resource_attributes {
        attributes.push(KeyValue::new(key.clone(), value.clone()));
    }
    let resource = Resource::builder().with_attributes(attributes).build();

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.to_string())
        .build()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource)
        .build();
    let tracer = provider.tracer(config.service_name.clone());

    Ok((tracer, provider))
}

/// Flush and stop the OTLP exporter, if one was installed.
pub fn shutdown() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::debug!(error = %e, "tracer provider shutdown reported an error");
        }
    }
}

pub fn init_from_env() -> Result<(), ObservabilityError> {
    init(ObservabilityConfig::from_env())
}
