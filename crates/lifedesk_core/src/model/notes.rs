//! Notebook hierarchy: notebooks contain sections, sections contain pages.

use super::{EntityId, Identified};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub id: EntityId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub notebook_id: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub section_id: Option<EntityId>,
}

impl Identified for Notebook {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Identified for Section {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Identified for Page {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body for creating a notebook or section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleDraft {
    pub title: String,
}

/// Body for creating or saving a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDraft {
    pub title: String,
    pub content: String,
}
