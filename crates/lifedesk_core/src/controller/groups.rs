//! Expense-sharing groups: list, details fan-in, membership.

use super::{
    CommitOutcome, ControllerContext, Creatable, DeleteOutcome, Deletable, MemberSearch, Resource,
    ResourceController, Synced,
};
use crate::config::ClientConfig;
use crate::model::group::{Group, GroupDetails, GroupDraft};
use crate::model::EntityId;
use crate::notify::Confirm;
use crate::transport::{ApiRequest, ApiResult};
use log::{debug, info};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct Groups;

impl Resource for Groups {
    type Filter = ();
    type Entity = Group;

    const NAME: &'static str = "groups";
    const LABEL: &'static str = "Group";

    fn list_request(_filter: &()) -> Option<ApiRequest> {
        Some(ApiRequest::get("/groups/"))
    }
}

impl Creatable for Groups {
    type Draft = GroupDraft;

    fn create_request(_filter: &(), draft: &GroupDraft) -> ApiResult<ApiRequest> {
        ApiRequest::post("/groups/").with_json(draft)
    }
}

impl Deletable for Groups {
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this group?";

    fn delete_request(id: EntityId) -> ApiRequest {
        ApiRequest::delete(format!("/groups/{id}"))
    }
}

/// Group list, the open group's details and the member picker.
pub struct GroupsController {
    ctx: ControllerContext,
    collection: ResourceController<Groups>,
    details: Mutex<Synced<Option<EntityId>, Option<GroupDetails>>>,
    member_search: MemberSearch,
}

impl GroupsController {
    pub fn new(ctx: ControllerContext, config: &ClientConfig) -> Self {
        Self {
            collection: ResourceController::new(ctx.clone(), ()),
            details: Mutex::new(Synced::new(None, None)),
            member_search: MemberSearch::new(ctx.clone(), config),
            ctx,
        }
    }

    pub fn collection(&self) -> &ResourceController<Groups> {
        &self.collection
    }

    pub fn member_search(&self) -> &MemberSearch {
        &self.member_search
    }

    fn details_state(&self) -> MutexGuard<'_, Synced<Option<EntityId>, Option<GroupDetails>>> {
        self.details.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Details of the open group, if they loaded completely.
    pub fn current_details(&self) -> Option<GroupDetails> {
        self.details_state().value().clone()
    }

    pub fn open_group_id(&self) -> Option<EntityId> {
        *self.details_state().filter()
    }

    /// Fetches group, members and expenses concurrently.
    ///
    /// All three must succeed for anything to be shown; a failure in any
    /// leaves no details for a newly opened group.
    pub async fn details(&self, group_id: EntityId) -> ApiResult<GroupDetails> {
        let ticket = {
            let mut state = self.details_state();
            if *state.filter() != Some(group_id) {
                state.reset(Some(group_id), None);
            }
            state.begin(Some(group_id))
        };

        let result = self.fetch_details(group_id).await;
        let committed = match &result {
            Ok(details) => Ok(Some(details.clone())),
            Err(err) => Err(err.clone()),
        };
        let outcome = self.details_state().finish(&ticket, &committed);
        match (&outcome, &result) {
            (CommitOutcome::Failed, Err(err)) => {
                self.ctx
                    .notify_error(Groups::NAME, "Could not load group details".to_string(), err)
            }
            _ => debug!(
                "event=group_details module=groups status={:?} group_id={}",
                outcome, group_id
            ),
        }
        result
    }

    async fn fetch_details(&self, group_id: EntityId) -> ApiResult<GroupDetails> {
        let token = self.ctx.session.require_token()?;
        let api = &self.ctx.api;
        let (group, members, expenses) = tokio::try_join!(
            api.group(group_id, &token),
            api.group_members(group_id, &token),
            api.group_expenses(group_id, &token),
        )?;
        Ok(GroupDetails {
            group,
            members,
            expenses,
        })
    }

    pub fn close_details(&self) {
        self.details_state().reset(None, None);
    }

    /// Adds `user_id` to the group and refreshes its details when open.
    pub async fn add_member(&self, group_id: EntityId, user_id: EntityId) -> ApiResult<()> {
        let result = match self.ctx.session.require_token() {
            Ok(token) => self.ctx.api.add_group_member(group_id, user_id, &token).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            self.ctx
                .notify_error(Groups::NAME, "Could not add member".to_string(), err);
            return result;
        }

        info!(
            "event=group_add_member module=groups status=ok group_id={} user_id={}",
            group_id, user_id
        );
        self.ctx
            .notify_success("Member added".to_string(), "Member added successfully");
        if self.open_group_id() == Some(group_id) {
            let _ = self.details(group_id).await;
        }
        Ok(())
    }

    /// Deletes a group; closes its details when they are open.
    pub async fn delete(&self, group_id: EntityId, confirm: &dyn Confirm) -> ApiResult<DeleteOutcome> {
        let outcome = self.collection.delete(group_id, confirm).await?;
        if outcome == DeleteOutcome::Deleted && self.open_group_id() == Some(group_id) {
            self.close_details();
        }
        Ok(outcome)
    }
}
