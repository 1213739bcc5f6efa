use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier grouping the turns of one conversation.
///
/// A session has no stored entity of its own; it exists only as the set of
/// turns sharing an `(owner_id, session_id)` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Fresh random identifier. No uniqueness check is made against storage.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Per-session aggregate as returned by a message store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAggregate {
    pub session_id: SessionId,
    pub last_message: String,
    pub last_timestamp: DateTime<Utc>,
    pub message_count: u64,
}

/// Session listing entry handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    #[serde(rename = "preview")]
    pub last_message_preview: String,
    pub last_timestamp: DateTime<Utc>,
    #[serde(rename = "count")]
    pub message_count: u64,
}
