//! Chat sessions: identity, windowed history and persistence of exchanges.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use scribe_core::{
    ChatTurn, EventRecord, EventRecordLookup, MessageStore, SessionId, SessionSummary, StoreError,
    TurnMetadata,
};
use scribe_observability::{exchange_span, record_duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument, Span};

use crate::config::DEFAULT_HISTORY_WINDOW;
use crate::error::{GenerationError, PersistenceWarning};
use crate::generation::ContentGenerationService;
use crate::prompt::build_contextual_chat_prompt;

/// Characters kept in a session preview before "..." is appended.
pub const PREVIEW_CHARS: usize = 50;
/// Sessions returned by [`ConversationSessionManager::list_sessions`].
pub const MAX_LISTED_SESSIONS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    pub owner_id: String,
    /// `None` starts a new session.
    pub session_id: Option<SessionId>,
    pub message: String,
    pub report_context_id: Option<String>,
}

impl SendMessage {
    pub fn new(owner_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            session_id: None,
            message: message.into(),
            report_context_id: None,
        }
    }

    pub fn in_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_report_context(mut self, report_id: impl Into<String>) -> Self {
        self.report_context_id = Some(report_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub session_id: SessionId,
    /// Set when the exchange was answered but could not be stored.
    pub warning: Option<PersistenceWarning>,
}

/// `now`, or one microsecond past `floor` when the clock has not moved beyond it.
fn strictly_after(now: DateTime<Utc>, floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match floor {
        Some(floor) if now <= floor => floor + ChronoDuration::microseconds(1),
        _ => now,
    }
}

/// First [`PREVIEW_CHARS`] characters of `text`, plus "..." when cut.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

pub struct ConversationSessionManager {
    generation: Arc<ContentGenerationService>,
    store: Arc<dyn MessageStore>,
    events: Option<Arc<dyn EventRecordLookup>>,
    history_window: usize,
}

impl ConversationSessionManager {
    pub fn new(generation: Arc<ContentGenerationService>, store: Arc<dyn MessageStore>) -> Self {
        Self {
            generation,
            store,
            events: None,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn with_event_lookup(mut self, events: Arc<dyn EventRecordLookup>) -> Self {
        self.events = Some(events);
        self
    }

    /// Exchanges of history per prompt; at least one.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window.max(1);
        self
    }

    /// Most recent turns of the session, oldest first.
    async fn windowed_history(&self, owner_id: &str, session_id: &SessionId) -> Vec<ChatTurn> {
        let limit = self.history_window * 2;
        match self.store.query_recent(owner_id, session_id, limit).await {
            Ok(mut turns) => {
                turns.reverse();
                turns
            }
            Err(e) => {
                warn!(error = %e, "could not load chat history, continuing without it");
                Vec::new()
            }
        }
    }

    /// Missing ids and lookup failures both mean "no context".
    async fn report_context(&self, report_id: Option<&str>) -> Option<EventRecord> {
        let id = report_id?;
        let Some(events) = &self.events else {
            debug!(report_id = id, "no event lookup configured");
            return None;
        };
        match events.by_id(id).await {
            Ok(Some(event)) => Some(event),
            Ok(None) => {
                debug!(report_id = id, "report context not found");
                None
            }
            Err(e) => {
                warn!(report_id = id, error = %e, "report context lookup failed");
                None
            }
        }
    }

    /// Answer `request` and store the exchange.
    ///
    /// Nothing is stored unless generation completes. A store failure after
    /// that is reported in [`ChatReply::warning`], not as an error.
    pub async fn send_message(
        &self,
        request: SendMessage,
        cancel: Option<&CancellationToken>,
    ) -> Result<ChatReply, GenerationError> {
        let session_id = request.session_id.clone().unwrap_or_else(SessionId::new);
        let span = exchange_span!(request.owner_id.as_str(), session_id.as_str());
        self.exchange(request, session_id, cancel)
            .instrument(span)
            .await
    }

    async fn exchange(
        &self,
        request: SendMessage,
        session_id: SessionId,
        cancel: Option<&CancellationToken>,
    ) -> Result<ChatReply, GenerationError> {
        let SendMessage {
            owner_id,
            message,
            report_context_id,
            ..
        } = request;
        let clock = self.generation.clock().clone();

        let history = self.windowed_history(&owner_id, &session_id).await;
        Span::current().record("history.turns", history.len() as u64);

        let context = self.report_context(report_context_id.as_deref()).await;
        let prompt = build_contextual_chat_prompt(&message, &history, context.as_ref());

        // Turns of a session are written with increasing timestamps, even
        // when the clock has not advanced.
        let user_at = strictly_after(clock.now(), history.last().map(|t| t.timestamp));
        let generation = self.generation.generate_chat_reply(&prompt, cancel).await?;
        record_duration("latency_ms", generation.latency);
        let assistant_at = strictly_after(clock.now(), Some(user_at));

        let metadata = TurnMetadata {
            report_context_id,
            latency_ms: Some(generation.latency.as_millis() as u64),
        };
        let user = ChatTurn::user(owner_id.as_str(), session_id.clone(), message)
            .at(user_at)
            .with_metadata(metadata.clone());
        let assistant = ChatTurn::assistant(owner_id.as_str(), session_id.clone(), generation.text.as_str())
            .at(assistant_at)
            .with_metadata(metadata);

        let warning = match self.store.append_exchange(&user, &assistant).await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "chat exchange delivered but not persisted");
                Some(PersistenceWarning::new(e.to_string()))
            }
        };

        info!(latency_ms = generation.latency.as_millis() as u64, "chat exchange complete");
        Ok(ChatReply {
            text: generation.text,
            session_id,
            warning,
        })
    }

    /// Up to [`MAX_LISTED_SESSIONS`] sessions, most recent first.
    pub async fn list_sessions(&self, owner_id: &str) -> Result<Vec<SessionSummary>, StoreError> {
        let mut sessions = self.store.list_sessions_for(owner_id).await?;
        sessions.sort_by(|a, b| b.last_timestamp.cmp(&a.last_timestamp));
        Ok(sessions
            .into_iter()
            .take(MAX_LISTED_SESSIONS)
            .map(|s| SessionSummary {
                last_message_preview: preview(&s.last_message),
                session_id: s.session_id,
                last_timestamp: s.last_timestamp,
                message_count: s.message_count,
            })
            .collect())
    }

    /// Every turn of the session, oldest first.
    pub async fn get_session_messages(
        &self,
        owner_id: &str,
        session_id: &SessionId,
    ) -> Result<Vec<ChatTurn>, StoreError> {
        self.store.query_all(owner_id, session_id).await
    }

    /// Deletes the session; deleting an unknown session returns 0.
    pub async fn delete_session(
        &self,
        owner_id: &str,
        session_id: &SessionId,
    ) -> Result<u64, StoreError> {
        let deleted = self.store.delete_all(owner_id, session_id).await?;
        info!(owner_id, session_id = %session_id, deleted, "session deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use scribe_core::{InMemoryMessageStore, InMemoryEventLookup, Role, SessionAggregate, StoreResult};
    use scribe_llm::{GenerateOptions, GenerativeBackend};
    use std::sync::Mutex;

    /// Echoes a fixed reply and records every prompt.
    #[derive(Default)]
    struct Recorder {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GenerativeBackend for Recorder {
        fn backend_id(&self) -> &str {
            "recorder"
        }

        async fn generate(&self, prompt: &str, _options: &GenerateOptions) -> scribe_llm::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("Sure, here you go.".to_string())
        }
    }

    /// Reads work, writes fail.
    struct ReadOnlyStore(InMemoryMessageStore);

    #[async_trait]
    impl MessageStore for ReadOnlyStore {
        async fn append(&self, _turn: &ChatTurn) -> StoreResult<()> {
            Err(StoreError::Task("disk full".to_string()))
        }

        async fn query_recent(&self, o: &str, s: &SessionId, l: usize) -> StoreResult<Vec<ChatTurn>> {
            self.0.query_recent(o, s, l).await
        }

        async fn query_all(&self, o: &str, s: &SessionId) -> StoreResult<Vec<ChatTurn>> {
            self.0.query_all(o, s).await
        }

        async fn delete_all(&self, o: &str, s: &SessionId) -> StoreResult<u64> {
            self.0.delete_all(o, s).await
        }

        async fn list_sessions_for(&self, o: &str) -> StoreResult<Vec<SessionAggregate>> {
            self.0.list_sessions_for(o).await
        }
    }

    fn generation(backend: Arc<Recorder>) -> Arc<ContentGenerationService> {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap());
        Arc::new(ContentGenerationService::new(backend).with_clock(Arc::new(clock)))
    }

    #[test]
    fn test_preview_truncates_by_characters() {
        assert_eq!(preview("short"), "short");
        let exact = "a".repeat(50);
        assert_eq!(preview(&exact), exact);
        let long = "é".repeat(60);
        assert_eq!(preview(&long), format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn test_strictly_after() {
        let t = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(strictly_after(t, None), t);
        assert_eq!(strictly_after(t, Some(t)), t + ChronoDuration::microseconds(1));
        assert_eq!(strictly_after(t + ChronoDuration::seconds(1), Some(t)), t + ChronoDuration::seconds(1));
    }

    #[tokio::test]
    async fn test_first_message_creates_session_with_two_turns() {
        let store = Arc::new(InMemoryMessageStore::new());
        let manager = ConversationSessionManager::new(generation(Arc::default()), store.clone());

        let reply = manager
            .send_message(SendMessage::new("u1", "Hi"), None)
            .await
            .unwrap();
        assert_eq!(reply.text, "Sure, here you go.");
        assert!(reply.warning.is_none());

        let turns = manager.get_session_messages("u1", &reply.session_id).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert!(turns[1].timestamp > turns[0].timestamp);
        assert_eq!(turns[0].metadata.latency_ms, turns[1].metadata.latency_ms);
    }

    #[tokio::test]
    async fn test_history_window_in_prompt() {
        let backend = Arc::new(Recorder::default());
        let store = Arc::new(InMemoryMessageStore::new());
        let sid = SessionId::from("s1");
        let base = Utc.with_ymd_and_hms(2024, 1, 9, 8, 0, 0).unwrap();
        for i in 0..14 {
            let turn = ChatTurn::user("u1", sid.clone(), format!("msg-{:02}", i))
                .at(base + ChronoDuration::seconds(i));
            store.append(&turn).await.unwrap();
        }

        let manager = ConversationSessionManager::new(generation(backend.clone()), store)
            .with_history_window(5);
        manager
            .send_message(SendMessage::new("u1", "next").in_session(sid), None)
            .await
            .unwrap();

        let prompt = backend.prompts.lock().unwrap()[0].clone();
        for i in 0..4 {
            assert!(!prompt.contains(&format!("msg-{:02}", i)));
        }
        let positions: Vec<usize> = (4..14)
            .map(|i| prompt.find(&format!("User: msg-{:02}", i)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_report_context_included_when_found() {
        let backend = Arc::new(Recorder::default());
        let events = Arc::new(InMemoryEventLookup::new());
        let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        events.insert("r1", EventRecord::new("Robotics Expo", day, day)).await;

        let manager = ConversationSessionManager::new(
            generation(backend.clone()),
            Arc::new(InMemoryMessageStore::new()),
        )
        .with_event_lookup(events);

        let request = SendMessage::new("u1", "Draft an intro").with_report_context("r1");
        let reply = manager.send_message(request, None).await.unwrap();
        let missing = SendMessage::new("u1", "And now?").with_report_context("nope");
        manager.send_message(missing, None).await.unwrap();

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("- Title: Robotics Expo"));
        assert!(!prompts[1].contains("## Report Context"));

        let turns = manager.get_session_messages("u1", &reply.session_id).await.unwrap();
        assert_eq!(turns[0].metadata.report_context_id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_store_failure_becomes_warning() {
        let store = Arc::new(ReadOnlyStore(InMemoryMessageStore::new()));
        let manager = ConversationSessionManager::new(generation(Arc::default()), store);

        let reply = manager
            .send_message(SendMessage::new("u1", "Hi"), None)
            .await
            .unwrap();
        assert_eq!(reply.text, "Sure, here you go.");
        let warning = reply.warning.unwrap();
        assert!(warning.message.contains("disk full"));
    }

    #[tokio::test]
    async fn test_cancelled_exchange_persists_nothing() {
        let store = Arc::new(InMemoryMessageStore::new());
        let manager = ConversationSessionManager::new(generation(Arc::default()), store.clone());
        let token = CancellationToken::new();
        token.cancel();

        let sid = SessionId::from("s1");
        let err = manager
            .send_message(SendMessage::new("u1", "Hi").in_session(sid.clone()), Some(&token))
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::Cancelled);
        assert!(store.query_all("u1", &sid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_sessions_preview_and_cap() {
        let store = Arc::new(InMemoryMessageStore::new());
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for i in 0..25 {
            let turn = ChatTurn::user("u1", SessionId::from(format!("s{}", i)), "x".repeat(80))
                .at(base + ChronoDuration::minutes(i));
            store.append(&turn).await.unwrap();
        }
        let manager = ConversationSessionManager::new(generation(Arc::default()), store);

        let sessions = manager.list_sessions("u1").await.unwrap();
        assert_eq!(sessions.len(), MAX_LISTED_SESSIONS);
        assert_eq!(sessions[0].session_id, SessionId::from("s24"));
        assert_eq!(sessions[0].last_message_preview, format!("{}...", "x".repeat(50)));
    }

    #[tokio::test]
    async fn test_delete_session_is_idempotent() {
        let manager = ConversationSessionManager::new(
            generation(Arc::default()),
            Arc::new(InMemoryMessageStore::new()),
        );
        let reply = manager
            .send_message(SendMessage::new("u1", "Hi"), None)
            .await
            .unwrap();

        assert_eq!(manager.delete_session("u1", &reply.session_id).await.unwrap(), 2);
        assert_eq!(manager.delete_session("u1", &reply.session_id).await.unwrap(), 0);
    }
}
