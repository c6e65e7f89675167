//! User profile and account payloads.

use super::{EntityId, Identified};
use serde::{Deserialize, Serialize};

/// Profile returned by `GET /me` and persisted next to the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: EntityId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Compact user record returned by member listings and user search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: EntityId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identified for UserSummary {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body of `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterDraft {
    pub email: String,
    pub username: String,
    pub password: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub is_active: bool,
}
