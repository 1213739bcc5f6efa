//! scribe_llm: generative text backends for the scribe report engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              ResilientBackend                │
//! │     (per-attempt timeout + backoff retry)    │
//! │                      │                       │
//! │      ┌───────────────┼───────────────┐       │
//! │      ▼               ▼               ▼       │
//! │ ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//! │ │  OpenAI  │   │  Ollama  │   │  Gemini  │  │
//! │ └──────────┘   └──────────┘   └──────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scribe_llm::{BackendKind, BackendSpec, GenerateOptions, build_backend};
//!
//! # async fn run() -> scribe_llm::Result<()> {
//! let backend = build_backend(&BackendSpec::new(BackendKind::Ollama))?;
//! let text = backend.generate("Say hello", &GenerateOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod kind;
pub mod providers;
pub mod resilient;

pub use backend::{GenerateOptions, GenerativeBackend};
pub use error::{BackendError, Result};
pub use kind::{BackendKind, BackendSpec, build_backend};
pub use providers::{GeminiBackend, OllamaBackend, OpenAiBackend};
pub use resilient::ResilientBackend;
