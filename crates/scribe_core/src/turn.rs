use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Capitalised label used when rendering history into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// One persisted chat message. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub session_id: SessionId,
    pub owner_id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: TurnMetadata,
}

impl ChatTurn {
    pub fn new(
        owner_id: impl Into<String>,
        session_id: SessionId,
        role: Role,
        content: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            owner_id: owner_id.into(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: TurnMetadata::default(),
        }
    }

    pub fn user(owner_id: impl Into<String>, session_id: SessionId, content: impl Into<String>) -> Self {
        Self::new(owner_id, session_id, Role::User, content)
    }

    pub fn assistant(
        owner_id: impl Into<String>,
        session_id: SessionId,
        content: impl Into<String>,
    ) -> Self {
        Self::new(owner_id, session_id, Role::Assistant, content)
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_metadata(mut self, metadata: TurnMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}
