use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::RecordId;
use super::serde_util;

pub const COMPLETE: u8 = 100;

/// Every user's task list, keyed by user id.
pub type TaskBook = BTreeMap<RecordId, Vec<Task>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "serde_util::optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_complete(&self) -> bool {
        self.progress >= COMPLETE
    }

    /// Overwrite the editable fields from a form, keeping creation metadata.
    pub fn apply(&mut self, draft: &TaskDraft, now: DateTime<Utc>) {
        let was_complete = self.is_complete();
        self.title = draft.title.clone();
        self.description = draft.description.clone();
        self.priority = draft.priority;
        self.due_date = draft.due_date;
        self.progress = draft.progress;
        self.updated_at = Some(now);
        match (was_complete, self.is_complete()) {
            (false, true) => self.completed_at = Some(now),
            (_, false) => self.completed_at = None,
            (true, true) => {}
        }
    }

    pub fn due_status(&self, today: NaiveDate) -> DueStatus {
        if self.is_complete() {
            return DueStatus::Normal;
        }
        match self.due_date {
            Some(due) => {
                let days_until = (due - today).num_days();
                if days_until < 0 {
                    DueStatus::Overdue
                } else if days_until <= 3 {
                    DueStatus::DueSoon
                } else {
                    DueStatus::Normal
                }
            }
            None => DueStatus::Normal,
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Task form contents. `id` is set when editing an existing task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "serde_util::optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress: u8,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Task title is required".to_string());
        }
        if self.progress > COMPLETE {
            return Err(format!("Progress must be between 0 and 100, got {}", self.progress));
        }
        Ok(())
    }

    pub fn into_task(self, id: RecordId, now: DateTime<Utc>) -> Task {
        let completed_at = (self.progress >= COMPLETE).then_some(now);
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            progress: self.progress,
            created_at: now,
            updated_at: Some(now),
            completed_at,
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            due_date: task.due_date,
            progress: task.progress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    DueSoon,
    Normal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressFilter {
    #[default]
    All,
    Incomplete,
    Complete,
}

/// Workspace search and filter settings.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub search: String,
    pub priority: Option<Priority>,
    pub progress: ProgressFilter,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !task.matches_search(&needle) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        match self.progress {
            ProgressFilter::All => true,
            ProgressFilter::Incomplete => !task.is_complete(),
            ProgressFilter::Complete => task.is_complete(),
        }
    }

    /// Filter and order tasks for the workspace: open tasks first, then by
    /// due date (undated last), then highest priority first.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut out: Vec<Task> = tasks.iter().filter(|t| self.matches(t)).cloned().collect();
        out.sort_by(workspace_order);
        out
    }
}

fn workspace_order(a: &Task, b: &Task) -> Ordering {
    a.is_complete()
        .cmp(&b.is_complete())
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.priority.cmp(&a.priority))
}
