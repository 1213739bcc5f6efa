use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::block::ContentBlock;
use crate::error::ValidationError;

/// Rendered in place of any blank optional field.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Returns `value`, or [`NOT_SPECIFIED`] when it is blank.
pub fn or_not_specified(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_SPECIFIED
    } else {
        trimmed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinator {
    pub name: String,
    #[serde(default)]
    pub designation: String,
}

impl Coordinator {
    pub fn new(name: impl Into<String>, designation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            designation: designation.into(),
        }
    }
}

/// Snapshot of an event as owned by the report-management side.
///
/// The engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub organized_by: String,
    #[serde(default)]
    pub institute: String,
    #[serde(default)]
    pub venue: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub participant_count: u32,
    #[serde(default)]
    pub faculty_coordinators: Vec<Coordinator>,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
}

impl EventRecord {
    pub fn new(title: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            title: title.into(),
            event_type: String::new(),
            organized_by: String::new(),
            institute: String::new(),
            venue: String::new(),
            start_date,
            end_date,
            target_audience: String::new(),
            participant_count: 0,
            faculty_coordinators: Vec::new(),
            content_blocks: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn with_organizer(mut self, organized_by: impl Into<String>) -> Self {
        self.organized_by = organized_by.into();
        self
    }

    pub fn with_institute(mut self, institute: impl Into<String>) -> Self {
        self.institute = institute.into();
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = venue.into();
        self
    }

    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    pub fn with_participants(mut self, count: u32) -> Self {
        self.participant_count = count;
        self
    }

    pub fn with_coordinator(mut self, coordinator: Coordinator) -> Self {
        self.faculty_coordinators.push(coordinator);
        self
    }

    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.content_blocks.push(block);
        self
    }

    /// Boundary check applied before a record is handed to the engine.
    ///
    /// Block-level field requirements are already enforced while decoding.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "title" });
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::DateOrder {
                start: self.start_date.to_string(),
                end: self.end_date.to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let record: EventRecord =
            serde_json::from_str(json).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_or_not_specified() {
        assert_eq!(or_not_specified(""), NOT_SPECIFIED);
        assert_eq!(or_not_specified("   "), NOT_SPECIFIED);
        assert_eq!(or_not_specified(" Hall A "), "Hall A");
    }

    #[test]
    fn test_builder() {
        let event = EventRecord::new("AI Workshop", date(2024, 1, 10), date(2024, 1, 11))
            .with_participants(120)
            .with_coordinator(Coordinator::new("Dr. Rao", "Professor"));
        assert_eq!(event.participant_count, 120);
        assert_eq!(event.faculty_coordinators.len(), 1);
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_reversed_dates() {
        let event = EventRecord::new("AI Workshop", date(2024, 1, 11), date(2024, 1, 10));
        assert!(matches!(
            event.validate(),
            Err(ValidationError::DateOrder { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let event = EventRecord::new("  ", date(2024, 1, 10), date(2024, 1, 10));
        assert_eq!(
            event.validate(),
            Err(ValidationError::MissingField { field: "title" })
        );
    }

    #[test]
    fn test_from_json_camel_case() {
        let json = r#"{
            "title": "Hackathon",
            "eventType": "Competition",
            "startDate": "2024-03-01",
            "endDate": "2024-03-02",
            "participantCount": 64,
            "facultyCoordinators": [{"name": "Dr. Iyer", "designation": "HOD"}],
            "contentBlocks": [{"type": "achievement", "id": "a1", "title": "Winner", "content": "Team Alpha"}]
        }"#;
        let event = EventRecord::from_json(json).unwrap();
        assert_eq!(event.event_type, "Competition");
        assert_eq!(event.participant_count, 64);
        assert_eq!(event.content_blocks.len(), 1);
        assert!(event.venue.is_empty());
    }

    #[test]
    fn test_from_json_rejects_invalid_block() {
        let json = r#"{
            "title": "Hackathon",
            "startDate": "2024-03-01",
            "endDate": "2024-03-02",
            "contentBlocks": [{"type": "quote", "id": "q1", "content": "no title"}]
        }"#;
        assert!(matches!(
            EventRecord::from_json(json),
            Err(ValidationError::Malformed(_))
        ));
    }
}
