//! Read-only access to event records by id.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::record::EventRecord;
use crate::error::{Result, ScribeError};

#[async_trait]
pub trait EventRecordLookup: Send + Sync {
    /// `Ok(None)` when no record exists for `id`.
    async fn by_id(&self, id: &str) -> Result<Option<EventRecord>>;
}

/// Map-backed lookup for tests and embedding.
#[derive(Default)]
pub struct InMemoryEventLookup {
    records: RwLock<HashMap<String, EventRecord>>,
}

impl InMemoryEventLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: impl Into<String>, record: EventRecord) {
        self.records.write().await.insert(id.into(), record);
    }
}

#[async_trait]
impl EventRecordLookup for InMemoryEventLookup {
    async fn by_id(&self, id: &str) -> Result<Option<EventRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }
}

/// Reads `<dir>/<id>.json`, validating the record on load.
pub struct JsonDirEventLookup {
    dir: PathBuf,
}

impl JsonDirEventLookup {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Ids are file stems; only `[A-Za-z0-9_-]` is accepted.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| self.dir.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl EventRecordLookup for JsonDirEventLookup {
    async fn by_id(&self, id: &str) -> Result<Option<EventRecord>> {
        let Some(path) = self.path_for(id) else {
            debug!(id, "rejected event id");
            return Ok(None);
        };

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ScribeError::Io(e)),
        };

        let mut record = EventRecord::from_json(&raw)?;
        if record.id.is_none() {
            record.id = Some(id.to_string());
        }
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> EventRecord {
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        EventRecord::new("Seminar", day, day)
    }

    #[tokio::test]
    async fn test_in_memory_lookup() {
        let lookup = InMemoryEventLookup::new();
        lookup.insert("e1", sample()).await;

        assert!(lookup.by_id("e1").await.unwrap().is_some());
        assert!(lookup.by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_dir_lookup_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("seminar-1.json"),
            serde_json::to_string(&sample()).unwrap(),
        )
        .unwrap();

        let lookup = JsonDirEventLookup::new(dir.path());
        let record = lookup.by_id("seminar-1").await.unwrap().unwrap();
        assert_eq!(record.title, "Seminar");
        assert_eq!(record.id.as_deref(), Some("seminar-1"));
    }

    #[tokio::test]
    async fn test_json_dir_lookup_missing_and_invalid_ids() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = JsonDirEventLookup::new(dir.path());

        assert!(lookup.by_id("nope").await.unwrap().is_none());
        assert!(lookup.by_id("../etc/passwd").await.unwrap().is_none());
        assert!(lookup.by_id("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_dir_lookup_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();

        let lookup = JsonDirEventLookup::new(dir.path());
        assert!(lookup.by_id("bad").await.is_err());
    }
}
