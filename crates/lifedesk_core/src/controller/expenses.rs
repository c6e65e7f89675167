use super::{Creatable, Deletable, Resource, ResourceController};
use crate::model::expense::{Expense, ExpenseDraft, ExpenseFilter};
use crate::model::EntityId;
use crate::transport::{ApiRequest, ApiResult};

/// Personal and group expenses for one period.
pub struct Expenses;

pub type ExpensesController = ResourceController<Expenses>;

impl Resource for Expenses {
    type Filter = ExpenseFilter;
    type Entity = Expense;

    const NAME: &'static str = "expenses";
    const LABEL: &'static str = "Expense";

    fn list_request(filter: &ExpenseFilter) -> Option<ApiRequest> {
        Some(
            ApiRequest::get("/expenses/")
                .with_query("period", filter.period.as_str())
                .with_query("value", filter.value()),
        )
    }
}

impl Creatable for Expenses {
    type Draft = ExpenseDraft;

    fn create_request(_filter: &ExpenseFilter, draft: &ExpenseDraft) -> ApiResult<ApiRequest> {
        ApiRequest::post("/expenses/").with_json(draft)
    }
}

impl Deletable for Expenses {
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this expense?";

    fn delete_request(id: EntityId) -> ApiRequest {
        ApiRequest::delete(format!("/expenses/{id}"))
    }
}
