//! scribe-engine: turns event records and chat messages into generated text.
//!
//! - [`prompt`] builds deterministic prompts.
//! - [`generation::ContentGenerationService`] calls the backend, with a
//!   template fallback for full reports.
//! - [`conversation::ConversationSessionManager`] owns the chat flow and its
//!   windowed history.
//! - [`api::ReportEngine`] is the facade callers use.

pub mod api;
pub mod clock;
pub mod config;
pub mod conversation;
pub mod error;
pub mod fallback;
mod format;
pub mod generation;
pub mod prompt;

pub use api::{
    ChatRequest, ChatResponse, ConnectivityResponse, DeleteResponse, HistoryEntry, ReportEngine,
    ReportEngineBuilder, SessionListEntry, TextResponse,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use conversation::{ChatReply, ConversationSessionManager, SendMessage};
pub use error::{EngineError, GenerationError, PersistenceWarning, Result};
pub use fallback::{build_fallback_report, compute_duration, render_content_blocks, FILLER_PARAGRAPH};
pub use generation::{ChatGeneration, ContentGenerationService, GenerationPhase};
