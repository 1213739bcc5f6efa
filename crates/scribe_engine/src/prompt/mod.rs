//! Prompt construction. Every function here is pure: same inputs, same text.
//!
//! - **event**: full report, summary and recommendations prompts
//! - **block**: single content-block prompts
//! - **chat**: contextual assistant prompt with windowed history

mod block;
mod chat;
mod event;

pub use block::build_block_prompt;
pub use chat::{build_contextual_chat_prompt, CHAT_PREAMBLE};
pub use event::{
    build_recommendations_prompt, build_report_prompt, build_summary_prompt, REPORT_SECTIONS,
};

/// Probe sent by the connectivity check.
pub const CONNECTIVITY_PROMPT: &str =
    "This is a connectivity check. Reply with exactly the text CONNECTION_OK and nothing else.";

/// Marker the probe reply must contain.
pub const CONNECTIVITY_MARKER: &str = "CONNECTION_OK";
