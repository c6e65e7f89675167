//! DSA practice problems and their tags.

use super::{EntityId, Identified};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
    NotStarted,
    InProgress,
    Completed,
    NeedReview,
}

impl ProblemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::NeedReview => "need_review",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "need_review" => Some(Self::NeedReview),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: EntityId,
    pub name: String,
}

impl Identified for Tag {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    pub status: ProblemStatus,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub confidence_score: u8,
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub time_complexity: Option<String>,
    #[serde(default)]
    pub space_complexity: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Problem {
    /// Case-insensitive substring match over title and description.
    pub fn matches_text(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

impl Identified for Problem {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body of `POST /problems` and `PUT /problems/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemDraft {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub status: ProblemStatus,
    pub source_url: Option<String>,
    pub confidence_score: u8,
    pub priority: u8,
    pub notes: Option<String>,
    pub solution: Option<String>,
    pub time_complexity: Option<String>,
    pub space_complexity: Option<String>,
    pub tag_ids: Vec<EntityId>,
}

/// Server-side narrowing for `GET /problems`; unset fields are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProblemFilter {
    pub difficulty: Option<Difficulty>,
    pub status: Option<ProblemStatus>,
    pub tag_id: Option<EntityId>,
}

impl ProblemFilter {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty".to_string(), difficulty.as_str().to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(tag_id) = self.tag_id {
            pairs.push(("tag_id".to_string(), tag_id.to_string()));
        }
        pairs
    }
}

/// Body of `POST /tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDraft {
    pub name: String,
}
