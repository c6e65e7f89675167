use super::{Creatable, Deletable, Resource, ResourceController, Updatable};
use crate::model::todo::{Todo, TodoDraft, TodoPatch, TodoScope, TodoStatus};
use crate::model::EntityId;
use crate::transport::{ApiError, ApiRequest, ApiResult};

pub struct Todos;

pub type TodosController = ResourceController<Todos>;

impl Resource for Todos {
    type Filter = TodoScope;
    type Entity = Todo;

    const NAME: &'static str = "todos";
    const LABEL: &'static str = "Todo";

    fn list_request(scope: &TodoScope) -> Option<ApiRequest> {
        Some(match scope {
            TodoScope::Active => ApiRequest::get("/todos/"),
            TodoScope::Completed => ApiRequest::get("/todos/completed"),
        })
    }
}

impl Creatable for Todos {
    type Draft = TodoDraft;

    fn create_request(_scope: &TodoScope, draft: &TodoDraft) -> ApiResult<ApiRequest> {
        ApiRequest::post("/todos/").with_json(draft)
    }
}

impl Updatable for Todos {
    type Patch = TodoPatch;

    fn update_request(id: EntityId, patch: &TodoPatch) -> ApiResult<ApiRequest> {
        ApiRequest::patch(format!("/todos/{id}")).with_json(patch)
    }
}

impl Deletable for Todos {
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this todo?";

    fn delete_request(id: EntityId) -> ApiRequest {
        ApiRequest::delete(format!("/todos/{id}"))
    }
}

impl ResourceController<Todos> {
    /// Moves a cached todo to `status`, resending its other fields unchanged.
    pub async fn set_status(&self, id: EntityId, status: TodoStatus) -> ApiResult<Todo> {
        let Some(todo) = self.find(id) else {
            let err = ApiError::local(format!("todo {id} is not in the current list"));
            self.context()
                .notify_error(Todos::NAME, "Could not update todos".to_string(), &err);
            return Err(err);
        };
        self.update(id, &todo.with_status(status)).await
    }
}
