//! Expense-sharing groups.

use super::expense::Expense;
use super::user::UserSummary;
use super::{EntityId, Identified};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub created_by: Option<EntityId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub member_count: Option<u32>,
}

impl Identified for Group {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body of `POST /groups/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDraft {
    pub name: String,
    pub member_ids: Vec<EntityId>,
}

/// Group detail view assembled from three concurrent fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDetails {
    pub group: Group,
    pub members: Vec<UserSummary>,
    pub expenses: Vec<Expense>,
}

impl GroupDetails {
    pub fn filtered_expenses(&self, filter: &GroupExpenseFilter) -> Vec<Expense> {
        filter.apply(&self.expenses)
    }
}

/// Local narrowing of a group's expenses; never sent to the server.
///
/// Date bounds are inclusive whole days. Expenses with an unparseable
/// timestamp are kept only when no date bound is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupExpenseFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub user_id: Option<EntityId>,
}

impl GroupExpenseFilter {
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none() && self.date_to.is_none() && self.user_id.is_none()
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(user_id) = self.user_id {
            if expense.user_id != Some(user_id) {
                return false;
            }
        }
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(date) = expense.expense_date() else {
            return false;
        };
        self.date_from.map_or(true, |from| date >= from) && self.date_to.map_or(true, |to| date <= to)
    }

    pub fn apply(&self, expenses: &[Expense]) -> Vec<Expense> {
        expenses
            .iter()
            .filter(|expense| self.matches(expense))
            .cloned()
            .collect()
    }
}
