use super::{Creatable, Deletable, Resource, ResourceController, Updatable};
use crate::model::problem::{Problem, ProblemDraft, ProblemFilter, Tag, TagDraft};
use crate::model::EntityId;
use crate::transport::{ApiRequest, ApiResult};

pub struct Problems;

pub type ProblemsController = ResourceController<Problems>;

impl Resource for Problems {
    type Filter = ProblemFilter;
    type Entity = Problem;

    const NAME: &'static str = "problems";
    const LABEL: &'static str = "Problem";

    fn list_request(filter: &ProblemFilter) -> Option<ApiRequest> {
        let request = filter
            .query_pairs()
            .into_iter()
            .fold(ApiRequest::get("/problems"), |request, (key, value)| {
                request.with_query(key, value)
            });
        Some(request)
    }
}

impl Creatable for Problems {
    type Draft = ProblemDraft;

    fn create_request(_filter: &ProblemFilter, draft: &ProblemDraft) -> ApiResult<ApiRequest> {
        ApiRequest::post("/problems").with_json(draft)
    }
}

impl Updatable for Problems {
    type Patch = ProblemDraft;

    fn update_request(id: EntityId, patch: &ProblemDraft) -> ApiResult<ApiRequest> {
        ApiRequest::put(format!("/problems/{id}")).with_json(patch)
    }
}

impl Deletable for Problems {
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this problem?";

    fn delete_request(id: EntityId) -> ApiRequest {
        ApiRequest::delete(format!("/problems/{id}"))
    }
}

impl ResourceController<Problems> {
    /// Local text search over the loaded list; never hits the network.
    pub fn search(&self, query: &str) -> Vec<Problem> {
        self.items()
            .into_iter()
            .filter(|problem| problem.matches_text(query))
            .collect()
    }
}

pub struct Tags;

pub type TagsController = ResourceController<Tags>;

impl Resource for Tags {
    type Filter = ();
    type Entity = Tag;

    const NAME: &'static str = "tags";
    const LABEL: &'static str = "Tag";

    fn list_request(_filter: &()) -> Option<ApiRequest> {
        Some(ApiRequest::get("/tags"))
    }
}

impl Creatable for Tags {
    type Draft = TagDraft;

    fn create_request(_filter: &(), draft: &TagDraft) -> ApiResult<ApiRequest> {
        ApiRequest::post("/tags").with_json(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::Problems;
    use crate::controller::Resource;
    use crate::model::problem::{Difficulty, ProblemFilter};

    #[test]
    fn unfiltered_list_has_no_query() {
        let request = Problems::list_request(&ProblemFilter::default()).unwrap();
        assert_eq!(request.route_key(), "GET /problems");

        let filter = ProblemFilter {
            difficulty: Some(Difficulty::Medium),
            ..ProblemFilter::default()
        };
        let request = Problems::list_request(&filter).unwrap();
        assert_eq!(request.route_key(), "GET /problems?difficulty=medium");
    }
}
