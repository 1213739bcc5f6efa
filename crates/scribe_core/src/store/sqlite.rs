//! SQLite-backed message store (chat_turns table).

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::{layout, migrations, MessageStore, StoreResult};
use crate::error::StoreError;
use crate::session::{SessionAggregate, SessionId};
use crate::turn::{ChatTurn, Role, TurnMetadata};

/// Durable store. Queries run on the blocking pool so async callers never
/// wait on SQLite I/O directly.
#[derive(Clone)]
pub struct SqliteMessageStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMessageStore {
    /// Opens (or creates) `scribe.db` under `data_dir`, enables WAL, runs migrations.
    pub fn open_in_dir(data_dir: &Path) -> StoreResult<Self> {
        let db_path = layout::ensure_data_dir(data_dir)?;
        Self::open(&db_path)
    }

    /// Opens the database file at `db_path`.
    pub fn open(db_path: &Path) -> StoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        migrations::run_all(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_all(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

const SELECT_COLUMNS: &str =
    "SELECT owner_id, session_id, role, content, ts_micros, report_context_id, latency_ms FROM chat_turns";

fn insert_turn(conn: &Connection, turn: &ChatTurn) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO chat_turns (owner_id, session_id, role, content, ts_micros, report_context_id, latency_ms) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            turn.owner_id,
            turn.session_id.as_str(),
            turn.role.as_str(),
            turn.content,
            turn.timestamp.timestamp_micros(),
            turn.metadata.report_context_id,
            turn.metadata.latency_ms.map(|ms| ms as i64),
        ],
    )?;
    Ok(())
}

fn micros_to_datetime(micros: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {}", micros)))
}

/// Raw row; converted outside the rusqlite closure so decode errors map to `StoreError`.
struct TurnRow {
    owner_id: String,
    session_id: String,
    role: String,
    content: String,
    ts_micros: i64,
    report_context_id: Option<String>,
    latency_ms: Option<i64>,
}

impl TurnRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            owner_id: row.get(0)?,
            session_id: row.get(1)?,
            role: row.get(2)?,
            content: row.get(3)?,
            ts_micros: row.get(4)?,
            report_context_id: row.get(5)?,
            latency_ms: row.get(6)?,
        })
    }

    fn into_turn(self) -> StoreResult<ChatTurn> {
        let role: Role = self.role.parse().map_err(StoreError::Corrupt)?;
        Ok(ChatTurn {
            session_id: SessionId(self.session_id),
            owner_id: self.owner_id,
            role,
            content: self.content,
            timestamp: micros_to_datetime(self.ts_micros)?,
            metadata: TurnMetadata {
                report_context_id: self.report_context_id,
                latency_ms: self.latency_ms.map(|ms| ms.max(0) as u64),
            },
        })
    }
}

fn query_turns(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StoreResult<Vec<ChatTurn>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, TurnRow::from_row)?;
    let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(TurnRow::into_turn).collect()
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn append(&self, turn: &ChatTurn) -> StoreResult<()> {
        let turn = turn.clone();
        self.with_conn(move |conn| insert_turn(conn, &turn)).await
    }

    async fn append_exchange(&self, user: &ChatTurn, assistant: &ChatTurn) -> StoreResult<()> {
        let (user, assistant) = (user.clone(), assistant.clone());
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            insert_turn(&tx, &user)?;
            insert_turn(&tx, &assistant)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn query_recent(
        &self,
        owner_id: &str,
        session_id: &SessionId,
        limit: usize,
    ) -> StoreResult<Vec<ChatTurn>> {
        let owner_id = owner_id.to_string();
        let session_id = session_id.0.clone();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            query_turns(
                conn,
                &format!(
                    "{} WHERE owner_id = ?1 AND session_id = ?2 ORDER BY ts_micros DESC, id DESC LIMIT ?3",
                    SELECT_COLUMNS
                ),
                params![owner_id, session_id, limit],
            )
        })
        .await
    }

    async fn query_all(&self, owner_id: &str, session_id: &SessionId) -> StoreResult<Vec<ChatTurn>> {
        let owner_id = owner_id.to_string();
        let session_id = session_id.0.clone();
        self.with_conn(move |conn| {
            query_turns(
                conn,
                &format!(
                    "{} WHERE owner_id = ?1 AND session_id = ?2 ORDER BY ts_micros ASC, id ASC",
                    SELECT_COLUMNS
                ),
                params![owner_id, session_id],
            )
        })
        .await
    }

    async fn delete_all(&self, owner_id: &str, session_id: &SessionId) -> StoreResult<u64> {
        let owner_id = owner_id.to_string();
        let session_id = session_id.0.clone();
        self.with_conn(move |conn| {
            let n = conn.execute(
                "DELETE FROM chat_turns WHERE owner_id = ?1 AND session_id = ?2",
                params![owner_id, session_id],
            )?;
            Ok(n as u64)
        })
        .await
    }

    async fn list_sessions_for(&self, owner_id: &str) -> StoreResult<Vec<SessionAggregate>> {
        let owner_id = owner_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT session_id, content, ts_micros, cnt FROM (
                    SELECT session_id, content, ts_micros,
                        COUNT(*) OVER (PARTITION BY session_id) AS cnt,
                        ROW_NUMBER() OVER (PARTITION BY session_id ORDER BY ts_micros DESC, id DESC) AS rn
                    FROM chat_turns WHERE owner_id = ?1
                ) WHERE rn = 1 ORDER BY ts_micros DESC",
            )?;
            let rows = stmt.query_map(params![owner_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?;
            let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter()
                .map(|(session_id, last_message, ts, count)| -> StoreResult<SessionAggregate> {
                    Ok(SessionAggregate {
                        session_id: SessionId(session_id),
                        last_message,
                        last_timestamp: micros_to_datetime(ts)?,
                        message_count: count.max(0) as u64,
                    })
                })
                .collect()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    fn turn(session: &str, role: Role, content: &str, offset_ms: i64) -> ChatTurn {
        ChatTurn::new("u1", SessionId::from(session), role, content)
            .at(base() + Duration::milliseconds(offset_ms))
    }

    #[tokio::test]
    async fn test_round_trip_preserves_metadata() {
        let store = SqliteMessageStore::open_in_memory().unwrap();
        let original = turn("s1", Role::Assistant, "hello", 0).with_metadata(TurnMetadata {
            report_context_id: Some("r1".to_string()),
            latency_ms: Some(250),
        });
        store.append(&original).await.unwrap();

        let all = store.query_all("u1", &SessionId::from("s1")).await.unwrap();
        assert_eq!(all, vec![original]);
    }

    #[tokio::test]
    async fn test_query_recent_newest_first_with_limit() {
        let store = SqliteMessageStore::open_in_memory().unwrap();
        for i in 0..6 {
            store
                .append(&turn("s1", Role::User, &format!("m{}", i), i * 10))
                .await
                .unwrap();
        }

        let recent = store.query_recent("u1", &SessionId::from("s1"), 4).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["m5", "m4", "m3", "m2"]);
    }

    #[tokio::test]
    async fn test_append_exchange_writes_both_turns() {
        let store = SqliteMessageStore::open_in_memory().unwrap();
        store
            .append_exchange(
                &turn("s1", Role::User, "Hi", 0),
                &turn("s1", Role::Assistant, "Hello!", 1),
            )
            .await
            .unwrap();

        let all = store.query_all("u1", &SessionId::from("s1")).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].role, Role::User);
        assert_eq!(all[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_delete_all_counts_and_is_idempotent() {
        let store = SqliteMessageStore::open_in_memory().unwrap();
        store.append(&turn("s1", Role::User, "a", 0)).await.unwrap();
        store.append(&turn("s1", Role::Assistant, "b", 1)).await.unwrap();

        let sid = SessionId::from("s1");
        assert_eq!(store.delete_all("u1", &sid).await.unwrap(), 2);
        assert_eq!(store.delete_all("u1", &sid).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_sessions_for_aggregates() {
        let store = SqliteMessageStore::open_in_memory().unwrap();
        store.append(&turn("a", Role::User, "first", 0)).await.unwrap();
        store.append(&turn("b", Role::User, "q", 100)).await.unwrap();
        store.append(&turn("b", Role::Assistant, "answer", 200)).await.unwrap();

        let sessions = store.list_sessions_for("u1").await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, SessionId::from("b"));
        assert_eq!(sessions[0].last_message, "answer");
        assert_eq!(sessions[0].message_count, 2);
        assert_eq!(sessions[1].session_id, SessionId::from("a"));
    }

    #[tokio::test]
    async fn test_open_in_dir_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SqliteMessageStore::open_in_dir(dir.path()).unwrap();
            store.append(&turn("s1", Role::User, "kept", 0)).await.unwrap();
        }
        let reopened = SqliteMessageStore::open_in_dir(dir.path()).unwrap();
        let all = reopened.query_all("u1", &SessionId::from("s1")).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].content, "kept");
    }
}
