//! Shared backends, stores and fixtures for engine integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use scribe_core::{EventRecord, MessageStore};
use scribe_engine::{FixedClock, ReportEngine};
use scribe_llm::{BackendError, GenerateOptions, GenerativeBackend};

/// Replies from a queue (repeating the last one) and records every prompt.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            last: Mutex::new(String::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    fn backend_id(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, _options: &GenerateOptions) -> scribe_llm::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.replies.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}

/// Always fails as if the backend were unreachable.
#[allow(dead_code)]
pub struct UnavailableBackend;

#[async_trait]
impl GenerativeBackend for UnavailableBackend {
    fn backend_id(&self) -> &str {
        "unavailable"
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> scribe_llm::Result<String> {
        Err(BackendError::Status {
            backend: "unavailable".to_string(),
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2024-01-10..11, 120 participants, no content blocks.
#[allow(dead_code)]
pub fn workshop() -> EventRecord {
    EventRecord::new("Machine Learning Workshop", date(2024, 1, 10), date(2024, 1, 11))
        .with_event_type("Workshop")
        .with_organizer("Department of Computer Science")
        .with_institute("Institute of Technology")
        .with_venue("Seminar Hall A")
        .with_target_audience("Undergraduate students")
        .with_participants(120)
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap()))
}

pub fn engine(backend: Arc<dyn GenerativeBackend>, store: Arc<dyn MessageStore>) -> ReportEngine {
    ReportEngine::builder(backend, store)
        .clock(fixed_clock())
        .build()
}
