use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{MessageStore, StoreResult};
use crate::session::{SessionAggregate, SessionId};
use crate::turn::ChatTurn;

/// Turn plus its insertion sequence, used to break timestamp ties.
#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    turn: ChatTurn,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    entries: Vec<Entry>,
}

/// Process-local store. Contents are lost when it is dropped.
#[derive(Default)]
pub struct InMemoryMessageStore {
    inner: RwLock<Inner>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns of one session, oldest first.
    fn session_entries<'a>(
        inner: &'a Inner,
        owner_id: &'a str,
        session_id: &'a SessionId,
    ) -> Vec<&'a Entry> {
        let mut entries: Vec<&Entry> = inner
            .entries
            .iter()
            .filter(|e| e.turn.owner_id == owner_id && &e.turn.session_id == session_id)
            .collect();
        entries.sort_by_key(|e| (e.turn.timestamp, e.seq));
        entries
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, turn: &ChatTurn) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(Entry {
            seq,
            turn: turn.clone(),
        });
        Ok(())
    }

    async fn append_exchange(&self, user: &ChatTurn, assistant: &ChatTurn) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        for turn in [user, assistant] {
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.entries.push(Entry {
                seq,
                turn: turn.clone(),
            });
        }
        Ok(())
    }

    async fn query_recent(
        &self,
        owner_id: &str,
        session_id: &SessionId,
        limit: usize,
    ) -> StoreResult<Vec<ChatTurn>> {
        let inner = self.inner.read().await;
        Ok(Self::session_entries(&inner, owner_id, session_id)
            .into_iter()
            .rev()
            .take(limit)
            .map(|e| e.turn.clone())
            .collect())
    }

    async fn query_all(&self, owner_id: &str, session_id: &SessionId) -> StoreResult<Vec<ChatTurn>> {
        let inner = self.inner.read().await;
        Ok(Self::session_entries(&inner, owner_id, session_id)
            .into_iter()
            .map(|e| e.turn.clone())
            .collect())
    }

    async fn delete_all(&self, owner_id: &str, session_id: &SessionId) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner
            .entries
            .retain(|e| !(e.turn.owner_id == owner_id && &e.turn.session_id == session_id));
        Ok((before - inner.entries.len()) as u64)
    }

    async fn list_sessions_for(&self, owner_id: &str) -> StoreResult<Vec<SessionAggregate>> {
        let inner = self.inner.read().await;

        let mut latest: HashMap<&SessionId, (&Entry, u64)> = HashMap::new();
        for entry in inner.entries.iter().filter(|e| e.turn.owner_id == owner_id) {
            let slot = latest
                .entry(&entry.turn.session_id)
                .or_insert((entry, 0));
            slot.1 += 1;
            if (entry.turn.timestamp, entry.seq) > (slot.0.turn.timestamp, slot.0.seq) {
                slot.0 = entry;
            }
        }

        let mut sessions: Vec<SessionAggregate> = latest
            .into_values()
            .map(|(entry, count)| SessionAggregate {
                session_id: entry.turn.session_id.clone(),
                last_message: entry.turn.content.clone(),
                last_timestamp: entry.turn.timestamp,
                message_count: count,
            })
            .collect();
        sessions.sort_by(|a, b| b.last_timestamp.cmp(&a.last_timestamp));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn turn(owner: &str, session: &str, content: &str, offset_secs: i64) -> ChatTurn {
        let base = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        ChatTurn::user(owner, SessionId::from(session), content).at(base + Duration::seconds(offset_secs))
    }

    #[tokio::test]
    async fn test_query_recent_is_newest_first() {
        let store = InMemoryMessageStore::new();
        for i in 0..5 {
            store.append(&turn("u1", "s1", &format!("m{}", i), i)).await.unwrap();
        }

        let recent = store.query_recent("u1", &SessionId::from("s1"), 3).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["m4", "m3", "m2"]);
    }

    #[tokio::test]
    async fn test_query_all_is_oldest_first_and_owner_scoped() {
        let store = InMemoryMessageStore::new();
        store.append(&turn("u1", "s1", "second", 2)).await.unwrap();
        store.append(&turn("u1", "s1", "first", 1)).await.unwrap();
        store.append(&turn("u2", "s1", "other owner", 0)).await.unwrap();

        let all = store.query_all("u1", &SessionId::from("s1")).await.unwrap();
        let contents: Vec<_> = all.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let store = InMemoryMessageStore::new();
        store.append(&turn("u1", "s1", "a", 0)).await.unwrap();
        store.append(&turn("u1", "s1", "b", 0)).await.unwrap();

        let all = store.query_all("u1", &SessionId::from("s1")).await.unwrap();
        assert_eq!(all[0].content, "a");
        assert_eq!(all[1].content, "b");
    }

    #[tokio::test]
    async fn test_delete_all_is_idempotent() {
        let store = InMemoryMessageStore::new();
        store.append(&turn("u1", "s1", "a", 0)).await.unwrap();
        store.append(&turn("u1", "s1", "b", 1)).await.unwrap();
        store.append(&turn("u1", "s2", "c", 2)).await.unwrap();

        let sid = SessionId::from("s1");
        assert_eq!(store.delete_all("u1", &sid).await.unwrap(), 2);
        assert_eq!(store.delete_all("u1", &sid).await.unwrap(), 0);
        assert_eq!(store.query_all("u1", &SessionId::from("s2")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_sessions_for() {
        let store = InMemoryMessageStore::new();
        store.append(&turn("u1", "old", "x", 0)).await.unwrap();
        store.append(&turn("u1", "new", "y", 10)).await.unwrap();
        store.append(&turn("u1", "new", "z", 20)).await.unwrap();

        let sessions = store.list_sessions_for("u1").await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, SessionId::from("new"));
        assert_eq!(sessions[0].last_message, "z");
        assert_eq!(sessions[0].message_count, 2);
        assert_eq!(sessions[1].message_count, 1);
        assert!(store.list_sessions_for("nobody").await.unwrap().is_empty());
    }
}
