//! Chat-turn persistence.
//!
//! - **memory**: process-local store, used by tests and one-shot runs
//! - **sqlite**: durable store in a WAL-mode SQLite file
//! - **layout** / **migrations**: on-disk location and schema of the SQLite store

mod layout;
mod memory;
mod migrations;
mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::session::{SessionAggregate, SessionId};
use crate::turn::ChatTurn;

pub use layout::{ensure_data_dir, DATA_DB};
pub use memory::InMemoryMessageStore;
pub use sqlite::SqliteMessageStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Append-only storage of chat turns keyed by `(owner_id, session_id)`.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, turn: &ChatTurn) -> StoreResult<()>;

    /// Persist one user/assistant pair.
    ///
    /// The default issues two appends; stores with transactions override it
    /// so both turns become visible together.
    async fn append_exchange(&self, user: &ChatTurn, assistant: &ChatTurn) -> StoreResult<()> {
        self.append(user).await?;
        self.append(assistant).await
    }

    /// Up to `limit` turns, newest first.
    async fn query_recent(
        &self,
        owner_id: &str,
        session_id: &SessionId,
        limit: usize,
    ) -> StoreResult<Vec<ChatTurn>>;

    /// Every turn of the session, oldest first.
    async fn query_all(&self, owner_id: &str, session_id: &SessionId) -> StoreResult<Vec<ChatTurn>>;

    /// Removes the whole session and returns how many turns were deleted.
    async fn delete_all(&self, owner_id: &str, session_id: &SessionId) -> StoreResult<u64>;

    /// One aggregate per session of `owner_id`, most recently active first.
    async fn list_sessions_for(&self, owner_id: &str) -> StoreResult<Vec<SessionAggregate>>;
}
