//! Expense records and the period filter used to list them.

use super::{EntityId, Identified};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Group reference embedded in an expense row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseGroupRef {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: EntityId,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group_id: Option<EntityId>,
    #[serde(default)]
    pub group: Option<ExpenseGroupRef>,
    #[serde(default)]
    pub user_id: Option<EntityId>,
    /// Server timestamp, kept verbatim; see `expense_date`.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Expense {
    /// Label for the owning group, `Personal` when unassigned.
    pub fn group_label(&self) -> &str {
        self.group
            .as_ref()
            .map_or("Personal", |group| group.name.as_str())
    }

    /// Calendar date of `created_at`, if it parses.
    pub fn expense_date(&self) -> Option<NaiveDate> {
        self.created_at.as_deref().and_then(parse_timestamp_date)
    }
}

impl Identified for Expense {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body of `POST /expenses/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseDraft {
    pub amount: f64,
    pub description: String,
    pub group_id: Option<EntityId>,
}

/// Aggregation window understood by `GET /expenses/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Month,
    Year,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Some(Self::Day),
            "month" | "monthly" => Some(Self::Month),
            "year" | "yearly" => Some(Self::Year),
            _ => None,
        }
    }
}

/// Filter for the expenses list: a period anchored at a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub period: Period,
    pub date: NaiveDate,
}

impl ExpenseFilter {
    pub fn new(period: Period, date: NaiveDate) -> Self {
        Self { period, date }
    }

    /// Wire form of `date` (`YYYY-MM-DD`).
    pub fn value(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl Default for ExpenseFilter {
    /// Current month, anchored at today's local date.
    fn default() -> Self {
        Self::new(Period::Month, Local::now().date_naive())
    }
}

/// Extracts the calendar date from a server timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]`, or a bare date.
pub fn parse_timestamp_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.date_naive());
    }
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.date());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}
