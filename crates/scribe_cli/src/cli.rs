//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Event report writer and report-aware chat assistant
#[derive(Parser)]
#[command(name = "scribe", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Backend to use (openai, ollama, gemini). Uses SCRIBE_PROVIDER env if not set.
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model override. Uses SCRIBE_MODEL env if not set.
    #[arg(long, global = true)]
    pub model: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for machine consumption
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a full narrative report for an event record
    Report {
        /// Path to the event record JSON file
        #[arg(short, long)]
        event: PathBuf,
        /// Skip the backend and render the template report
        #[arg(long)]
        offline: bool,
    },
    /// Write a short summary of an event record
    Summary {
        #[arg(short, long)]
        event: PathBuf,
    },
    /// Suggest improvements for future editions of an event
    Recommendations {
        #[arg(short, long)]
        event: PathBuf,
    },
    /// Draft the content of a single report block
    Block {
        /// Block type (text, quote, achievement, image, or any custom name)
        #[arg(short = 't', long = "type")]
        block_type: String,
        /// Free-form context describing what the block should cover
        #[arg(short, long)]
        context: String,
    },
    /// Send one chat message, optionally continuing an existing session
    Chat {
        /// Owner the conversation belongs to
        #[arg(long)]
        owner: String,
        /// Session to continue (a new one is started when omitted)
        #[arg(short, long)]
        session: Option<String>,
        /// Message text
        #[arg(short, long)]
        message: String,
        /// Event record id used as report context (looked up in SCRIBE_EVENTS_DIR)
        #[arg(long)]
        report_context: Option<String>,
    },
    /// Inspect and delete stored chat sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Check that the configured backend answers
    Connectivity,
}

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List the most recent sessions of an owner
    List {
        #[arg(long)]
        owner: String,
    },
    /// Show every turn of a session, oldest first
    Show {
        #[arg(long)]
        owner: String,
        session: String,
    },
    /// Delete every turn of a session
    Delete {
        #[arg(long)]
        owner: String,
        session: String,
    },
}
