//! Caller-facing facade and its JSON request/response shapes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use scribe_core::{
    BlockKind, ChatTurn, EventRecord, EventRecordLookup, MessageStore, Role, SessionId,
    SessionSummary, ValidationError,
};
use scribe_llm::{GenerateOptions, GenerativeBackend};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, SystemClock};
use crate::config::{EngineConfig, DEFAULT_HISTORY_WINDOW};
use crate::conversation::{ChatReply, ConversationSessionManager, SendMessage};
use crate::error::Result;
use crate::generation::ContentGenerationService;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_context_id: Option<String>,
}

impl ChatRequest {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "ownerId" });
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "message" });
        }
        Ok(())
    }
}

impl From<ChatRequest> for SendMessage {
    fn from(request: ChatRequest) -> Self {
        SendMessage {
            owner_id: request.owner_id,
            session_id: request.session_id,
            message: request.message,
            report_context_id: request.report_context_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub text: String,
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence_warning: Option<String>,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        ChatResponse {
            text: reply.text,
            session_id: reply.session_id,
            persistence_warning: reply.warning.map(|w| w.to_string()),
        }
    }
}

/// `{sessionId, preview, lastTimestamp, count}`
pub type SessionListEntry = SessionSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ChatTurn> for HistoryEntry {
    fn from(turn: ChatTurn) -> Self {
        HistoryEntry {
            role: turn.role,
            content: turn.content,
            timestamp: turn.timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityResponse {
    pub connected: bool,
}

/// Wires a backend, a message store and an optional event lookup into the
/// generation and conversation services.
pub struct ReportEngineBuilder {
    backend: Arc<dyn GenerativeBackend>,
    store: Arc<dyn MessageStore>,
    events: Option<Arc<dyn EventRecordLookup>>,
    clock: Arc<dyn Clock>,
    options: GenerateOptions,
    history_window: usize,
}

impl ReportEngineBuilder {
    pub fn event_lookup(mut self, events: Arc<dyn EventRecordLookup>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Applies the request options and history window from `config`.
    pub fn config(self, config: &EngineConfig) -> Self {
        self.options(config.generate_options())
            .history_window(config.history_window)
    }

    pub fn build(self) -> ReportEngine {
        let generation = Arc::new(
            ContentGenerationService::new(self.backend)
                .with_clock(self.clock)
                .with_options(self.options),
        );
        let mut conversations = ConversationSessionManager::new(generation.clone(), self.store)
            .with_history_window(self.history_window);
        if let Some(events) = self.events {
            conversations = conversations.with_event_lookup(events);
        }
        ReportEngine {
            generation,
            conversations,
        }
    }
}

pub struct ReportEngine {
    generation: Arc<ContentGenerationService>,
    conversations: ConversationSessionManager,
}

impl ReportEngine {
    pub fn builder(
        backend: Arc<dyn GenerativeBackend>,
        store: Arc<dyn MessageStore>,
    ) -> ReportEngineBuilder {
        ReportEngineBuilder {
            backend,
            store,
            events: None,
            clock: Arc::new(SystemClock),
            options: GenerateOptions::default(),
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn generation(&self) -> &ContentGenerationService {
        &self.generation
    }

    pub fn conversations(&self) -> &ConversationSessionManager {
        &self.conversations
    }

    /// Never fails; falls back to the template report.
    pub async fn generate_full_report(&self, event: &EventRecord) -> TextResponse {
        TextResponse {
            text: self.generation.generate_report_content(event).await,
        }
    }

    pub async fn generate_summary(&self, event: &EventRecord) -> Result<TextResponse> {
        let text = self.generation.generate_event_summary(event).await?;
        Ok(TextResponse { text })
    }

    pub async fn generate_recommendations(&self, event: &EventRecord) -> Result<TextResponse> {
        let text = self.generation.generate_recommendations(event).await?;
        Ok(TextResponse { text })
    }

    pub async fn generate_block_content(
        &self,
        block_type: &str,
        context: &str,
    ) -> Result<TextResponse> {
        let kind = BlockKind::from_name(block_type);
        let text = self.generation.generate_block_content(&kind, context).await?;
        Ok(TextResponse { text })
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.chat_with_cancel(request, None).await
    }

    /// Like [`chat`](Self::chat), aborting generation when `cancel` fires.
    pub async fn chat_with_cancel(
        &self,
        request: ChatRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<ChatResponse> {
        request.validate()?;
        let reply = self
            .conversations
            .send_message(request.into(), cancel)
            .await?;
        Ok(reply.into())
    }

    pub async fn list_sessions(&self, owner_id: &str) -> Result<Vec<SessionListEntry>> {
        Ok(self.conversations.list_sessions(owner_id).await?)
    }

    pub async fn get_session_history(
        &self,
        owner_id: &str,
        session_id: &SessionId,
    ) -> Result<Vec<HistoryEntry>> {
        let turns = self
            .conversations
            .get_session_messages(owner_id, session_id)
            .await?;
        Ok(turns.into_iter().map(HistoryEntry::from).collect())
    }

    pub async fn delete_session(
        &self,
        owner_id: &str,
        session_id: &SessionId,
    ) -> Result<DeleteResponse> {
        let deleted_count = self
            .conversations
            .delete_session(owner_id, session_id)
            .await?;
        Ok(DeleteResponse { deleted_count })
    }

    pub async fn test_connectivity(&self) -> ConnectivityResponse {
        ConnectivityResponse {
            connected: self.generation.test_backend_connectivity().await,
        }
    }
}
