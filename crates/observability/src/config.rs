//! Configuration for observability/telemetry

use serde::{Deserialize, Serialize};

const DEFAULT_SERVICE_NAME: &str = "scribe";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Service name attached to exported traces
    #[serde(default = "default_service_name")]
    pub service_name: String,

    pub service_version: Option<String>,

    /// OTLP endpoint for trace export (e.g., "http://localhost:4317")
    pub otlp_endpoint: Option<String>,

    #[serde(default = "default_true")]
    pub enable_console: bool,

    /// Write console logs to stderr so stdout stays machine-readable
    #[serde(default)]
    pub log_to_stderr: bool,

    /// Filter directive (e.g., "info", "scribe_engine=debug").
    /// Falls back to `RUST_LOG`, then "info".
    pub log_level: Option<String>,

    #[serde(default)]
    pub resource_attributes: Vec<(String, String)>,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: None,
            otlp_endpoint: None,
            enable_console: true,
            log_to_stderr: false,
            log_level: None,
            resource_attributes: Vec::new(),
        }
    }
}

impl ObservabilityConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    pub fn with_stderr(mut self, stderr: bool) -> Self {
        self.log_to_stderr = stderr;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_resource_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.resource_attributes.push((key.into(), value.into()));
        self
    }

    /// Build from environment variables
    ///
    /// Reads:
    /// - `OTEL_SERVICE_NAME` → service_name
    /// - `OTEL_SERVICE_VERSION` → service_version
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT` → otlp_endpoint
    /// - `SCRIBE_LOG` or `RUST_LOG` → log_level
    pub fn from_env() -> Self {
        let service_name =
            std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| default_service_name());

        let service_version = std::env::var("OTEL_SERVICE_VERSION").ok();

        // OTLP only when explicitly set, otherwise console only.
        let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|e| !e.is_empty());

        let log_level = std::env::var("SCRIBE_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok();

        Self {
            service_name,
            service_version,
            otlp_endpoint,
            log_level,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ObservabilityConfig::new("scribe-cli")
            .with_version("0.1.0")
            .with_log_level("debug")
            .with_stderr(true)
            .with_resource_attribute("deployment.environment", "test");
        assert_eq!(config.service_name, "scribe-cli");
        assert_eq!(config.service_version.as_deref(), Some("0.1.0"));
        assert!(config.log_to_stderr);
        assert!(config.enable_console);
        assert_eq!(config.resource_attributes.len(), 1);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: ObservabilityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.service_name, "scribe");
        assert!(config.enable_console);
        assert!(config.otlp_endpoint.is_none());
    }
}
