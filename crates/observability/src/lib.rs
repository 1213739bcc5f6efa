//! Scribe Observability - tracing setup shared by the scribe crates
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter`, a console
//! fmt layer and, when an OTLP endpoint is configured, an OpenTelemetry
//! export layer.
//!
//! # Quick Start
//!
//! ```no_run
//! use scribe_observability::{ObservabilityConfig, init};
//!
//! let config = ObservabilityConfig::new("scribe")
//!     .with_log_level("debug")
//!     .with_stderr(true);
//! init(config)?;
//!
//! tracing::info!("engine ready");
//! # Ok::<(), scribe_observability::ObservabilityError>(())
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_SERVICE_NAME` - Service name (default `scribe`)
//! - `OTEL_SERVICE_VERSION` - Service version
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint; unset means console only
//! - `SCRIBE_LOG` or `RUST_LOG` - Log level filter

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracing;

pub use config::ObservabilityConfig;
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env, shutdown};
pub use tracing::{record_duration, record_error};

// Span macros are exported at the crate root via #[macro_export]:
// scribe_observability::generation_span!(), exchange_span!().
