//! Pending form state for create/edit modals.
//!
//! # Responsibility
//! - Hold raw text input exactly as typed.
//! - Validate and convert into typed request drafts before any request.
//!
//! # Invariants
//! - Conversion never issues network calls.
//! - Blank optional inputs become `None`, not empty strings.

use super::expense::ExpenseDraft;
use super::group::GroupDraft;
use super::problem::{Difficulty, Problem, ProblemDraft, ProblemStatus};
use super::todo::{TodoDraft, TodoStatus};
use super::user::{RegisterDraft, UserSummary};
use super::EntityId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_PROBLEM_SCORE: u8 = 5;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Local validation failure for a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    Required(&'static str),
    InvalidNumber { field: &'static str, value: String },
    InvalidEmail(String),
    OutOfRange { field: &'static str, min: u8, max: u8 },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "{field} is required"),
            Self::InvalidNumber { field, value } => {
                write!(f, "{field} must be a number, got `{value}`")
            }
            Self::InvalidEmail(value) => write!(f, "`{value}` is not a valid email address"),
            Self::OutOfRange { field, min, max } => {
                write!(f, "{field} must be between {min} and {max}")
            }
        }
    }
}

impl Error for FormError {}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn optional_id(field: &'static str, value: &str) -> Result<Option<EntityId>, FormError> {
    match optional(value) {
        None => Ok(None),
        Some(text) => text
            .parse::<EntityId>()
            .map(Some)
            .map_err(|_| FormError::InvalidNumber { field, value: text }),
    }
}

fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Registration modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub age: String,
    pub gender: String,
    pub country: String,
}

impl RegisterForm {
    pub fn to_draft(&self) -> Result<RegisterDraft, FormError> {
        let email = required("email", &self.email)?;
        if !is_valid_email(&email) {
            return Err(FormError::InvalidEmail(email));
        }
        let username = required("username", &self.username)?;
        if self.password.is_empty() {
            return Err(FormError::Required("password"));
        }
        let age = match optional(&self.age) {
            None => None,
            Some(text) => Some(text.parse::<u32>().map_err(|_| FormError::InvalidNumber {
                field: "age",
                value: text,
            })?),
        };

        Ok(RegisterDraft {
            email,
            username,
            password: self.password.clone(),
            age,
            gender: optional(&self.gender),
            country: optional(&self.country),
            is_active: true,
        })
    }
}

/// New-expense form; `group_id` blank means a personal expense.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub amount: String,
    pub description: String,
    pub group_id: String,
}

impl ExpenseForm {
    pub fn to_draft(&self) -> Result<ExpenseDraft, FormError> {
        let amount_text = required("amount", &self.amount)?;
        let amount = amount_text
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(FormError::InvalidNumber {
                field: "amount",
                value: amount_text,
            })?;
        Ok(ExpenseDraft {
            amount,
            description: required("description", &self.description)?,
            group_id: optional_id("group", &self.group_id)?,
        })
    }
}

/// New-group form with the members picked from user search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupForm {
    pub name: String,
    members: Vec<UserSummary>,
}

impl GroupForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn members(&self) -> &[UserSummary] {
        &self.members
    }

    /// Adds a member once; returns `false` when already present.
    pub fn add_member(&mut self, user: UserSummary) -> bool {
        if self.members.iter().any(|member| member.id == user.id) {
            return false;
        }
        self.members.push(user);
        true
    }

    pub fn remove_member(&mut self, user_id: EntityId) {
        self.members.retain(|member| member.id != user_id);
    }

    pub fn to_draft(&self) -> Result<GroupDraft, FormError> {
        Ok(GroupDraft {
            name: required("name", &self.name)?,
            member_ids: self.members.iter().map(|member| member.id).collect(),
        })
    }
}

/// New-todo form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub status: TodoStatus,
}

impl Default for TodoForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            status: TodoStatus::New,
        }
    }
}

impl TodoForm {
    pub fn to_draft(&self) -> Result<TodoDraft, FormError> {
        Ok(TodoDraft {
            title: required("title", &self.title)?,
            description: optional(&self.description),
            due_date: optional(&self.due_date),
            status: self.status,
        })
    }
}

/// Create/edit form for a problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemForm {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub status: ProblemStatus,
    pub source_url: String,
    pub confidence_score: u8,
    pub priority: u8,
    pub notes: String,
    pub solution: String,
    pub time_complexity: String,
    pub space_complexity: String,
    pub tag_ids: Vec<EntityId>,
}

impl Default for ProblemForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            difficulty: Difficulty::Easy,
            status: ProblemStatus::NotStarted,
            source_url: String::new(),
            confidence_score: 0,
            priority: 0,
            notes: String::new(),
            solution: String::new(),
            time_complexity: String::new(),
            space_complexity: String::new(),
            tag_ids: Vec::new(),
        }
    }
}

impl ProblemForm {
    /// Prefills the form for editing an existing problem.
    pub fn from_problem(problem: &Problem) -> Self {
        Self {
            title: problem.title.clone(),
            description: problem.description.clone(),
            difficulty: problem.difficulty,
            status: problem.status,
            source_url: problem.source_url.clone().unwrap_or_default(),
            confidence_score: problem.confidence_score,
            priority: problem.priority,
            notes: problem.notes.clone().unwrap_or_default(),
            solution: problem.solution.clone().unwrap_or_default(),
            time_complexity: problem.time_complexity.clone().unwrap_or_default(),
            space_complexity: problem.space_complexity.clone().unwrap_or_default(),
            tag_ids: problem.tags.iter().map(|tag| tag.id).collect(),
        }
    }

    pub fn to_draft(&self) -> Result<ProblemDraft, FormError> {
        for (field, value) in [
            ("confidence score", self.confidence_score),
            ("priority", self.priority),
        ] {
            if value > MAX_PROBLEM_SCORE {
                return Err(FormError::OutOfRange {
                    field,
                    min: 0,
                    max: MAX_PROBLEM_SCORE,
                });
            }
        }

        Ok(ProblemDraft {
            title: required("title", &self.title)?,
            description: self.description.trim().to_string(),
            difficulty: self.difficulty,
            status: self.status,
            source_url: optional(&self.source_url),
            confidence_score: self.confidence_score,
            priority: self.priority,
            notes: optional(&self.notes),
            solution: optional(&self.solution),
            time_complexity: optional(&self.time_complexity),
            space_complexity: optional(&self.space_complexity),
            tag_ids: self.tag_ids.clone(),
        })
    }
}
