use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::id::RecordId;
use super::serde_util;

static CLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d$").unwrap());

/// Every user's events, keyed by user id.
pub type EventBook = BTreeMap<RecordId, Vec<Event>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default, with = "serde_util::optional_text")]
    pub start_time: Option<String>,
    #[serde(default, with = "serde_util::optional_text")]
    pub end_time: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn apply(&mut self, draft: &EventDraft) {
        self.title = draft.title.clone();
        self.description = draft.description.clone();
        self.date = draft.date;
        self.start_time = draft.start_time.clone();
        self.end_time = draft.end_time.clone();
    }

    /// "09:00 – 10:30", "09:00", or "All day".
    pub fn time_label(&self) -> String {
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => format!("{} – {}", start, end),
            (Some(start), None) => start.clone(),
            _ => "All day".to_string(),
        }
    }
}

/// Event form contents. `id` is set when editing an existing event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default, with = "serde_util::optional_text")]
    pub start_time: Option<String>,
    #[serde(default, with = "serde_util::optional_text")]
    pub end_time: Option<String>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            date,
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_times(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.start_time = start.map(str::to_string);
        self.end_time = end.map(str::to_string);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Event title is required".to_string());
        }
        for time in [&self.start_time, &self.end_time].into_iter().flatten() {
            if !CLOCK_TIME_RE.is_match(time) {
                return Err(format!("'{}' is not a HH:MM time", time));
            }
        }
        Ok(())
    }

    pub fn into_event(self, id: RecordId, now: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: now,
        }
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        Self {
            id: Some(event.id),
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            start_time: event.start_time.clone(),
            end_time: event.end_time.clone(),
        }
    }
}
