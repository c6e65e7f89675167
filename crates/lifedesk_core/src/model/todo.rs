//! Todo items.

use super::expense::parse_timestamp_date;
use super::{EntityId, Identified};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    New,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "new" => Some(Self::New),
            "in_progress" => Some(Self::InProgress),
            "completed" | "done" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    pub status: TodoStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last change; for completed todos this is when they were completed.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Todo {
    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created_at.as_deref().and_then(parse_timestamp_date)
    }

    /// Date of the last change, only for completed todos.
    pub fn completed_date(&self) -> Option<NaiveDate> {
        if self.status != TodoStatus::Completed {
            return None;
        }
        self.updated_at.as_deref().and_then(parse_timestamp_date)
    }

    /// Full replacement payload with only `status` changed.
    pub fn with_status(&self, status: TodoStatus) -> TodoPatch {
        TodoPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date.clone(),
            status,
        }
    }
}

impl Identified for Todo {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body of `POST /todos/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: TodoStatus,
}

/// Body of `PATCH /todos/{id}`; the backend expects every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoPatch {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: TodoStatus,
}

/// Which todo collection a list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TodoScope {
    #[default]
    Active,
    Completed,
}
