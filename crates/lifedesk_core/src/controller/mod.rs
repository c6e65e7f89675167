//! Resource controllers: local caches of backend collections.
//!
//! # Responsibility
//! - Keep one list per domain tagged with the filter it was fetched for.
//! - Run create/update/delete against the backend and reconcile by refetch.
//! - Turn every failure into a notification at this boundary.
//!
//! # Invariants
//! - A superseded in-flight fetch never overwrites the list.
//! - State locks are never held across an await point.
//! - Nothing is retried; no optimistic inserts.
//!
//! # See also
//! - `synced` for the generation-tagging rules.

mod expenses;
mod groups;
mod notes;
mod problems;
mod search;
mod synced;
mod todos;

pub use expenses::{Expenses, ExpensesController};
pub use groups::{Groups, GroupsController};
pub use notes::{Notebooks, NotesController, Pages, Sections};
pub use problems::{Problems, ProblemsController, Tags, TagsController};
pub use search::MemberSearch;
pub use synced::{CommitOutcome, LoadTicket, Snapshot, Synced};
pub use todos::{Todos, TodosController};

use crate::model::{EntityId, Identified};
use crate::notify::{Confirm, Notification, Notifier};
use crate::session::SessionReader;
use crate::transport::{ApiClient, ApiError, ApiRequest, ApiResult};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Dependencies injected into every controller.
#[derive(Clone)]
pub struct ControllerContext {
    pub api: ApiClient,
    pub session: SessionReader,
    pub notifier: Arc<dyn Notifier>,
}

impl ControllerContext {
    pub fn new(api: ApiClient, session: SessionReader, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            session,
            notifier,
        }
    }

    pub(crate) fn notify_error(&self, module: &str, title: String, err: &ApiError) {
        warn!(
            "event=controller_error module={} kind={:?} status={:?} error={}",
            module, err.kind, err.status, err.detail
        );
        self.notifier
            .notify(Notification::error(title, err.user_message()));
    }

    pub(crate) fn notify_success(&self, title: String, message: impl Into<String>) {
        self.notifier.notify(Notification::success(title, message));
    }
}

/// Static description of one backend collection.
pub trait Resource: Send + Sync + 'static {
    type Filter: Clone + PartialEq + Debug + Send + Sync + 'static;
    type Entity: DeserializeOwned + Clone + Identified + Debug + Send + Sync + 'static;

    /// Module name used in log events.
    const NAME: &'static str;
    /// Singular label used in notifications.
    const LABEL: &'static str;

    /// `None` means the filter needs no request and the list is empty.
    fn list_request(filter: &Self::Filter) -> Option<ApiRequest>;
}

pub trait Creatable: Resource {
    type Draft: Send + Sync;

    /// # Errors
    /// - Local failure when the current filter cannot host a new entity.
    fn create_request(filter: &Self::Filter, draft: &Self::Draft) -> ApiResult<ApiRequest>;
}

pub trait Updatable: Resource {
    type Patch: Send + Sync;

    fn update_request(id: EntityId, patch: &Self::Patch) -> ApiResult<ApiRequest>;
}

pub trait Deletable: Resource {
    const DELETE_PROMPT: &'static str;

    fn delete_request(id: EntityId) -> ApiRequest;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The confirmation was declined; no request was sent.
    Declined,
}

/// Cached list plus mutations for one `Resource`.
pub struct ResourceController<R: Resource> {
    ctx: ControllerContext,
    state: Mutex<Synced<R::Filter, Vec<R::Entity>>>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceController<R> {
    pub fn new(ctx: ControllerContext, filter: R::Filter) -> Self {
        Self {
            ctx,
            state: Mutex::new(Synced::new(filter, Vec::new())),
            _resource: PhantomData,
        }
    }

    pub fn context(&self) -> &ControllerContext {
        &self.ctx
    }

    fn state(&self) -> MutexGuard<'_, Synced<R::Filter, Vec<R::Entity>>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `filter` current and fetches its list.
    ///
    /// Returns the fetched list even when a newer load superseded it; only
    /// the current one is committed.
    pub async fn load(&self, filter: R::Filter) -> ApiResult<Vec<R::Entity>> {
        let ticket = self.state().begin(filter);
        let result = match R::list_request(&ticket.filter) {
            None => Ok(Vec::new()),
            Some(request) => self.send_authenticated(request).await,
        };

        let outcome = self.state().finish(&ticket, &result);
        match outcome {
            CommitOutcome::Committed => debug!(
                "event=resource_load module={} status=ok generation={} filter={:?}",
                R::NAME,
                ticket.generation,
                ticket.filter
            ),
            CommitOutcome::Discarded => debug!(
                "event=resource_load module={} status=discarded generation={} filter={:?}",
                R::NAME,
                ticket.generation,
                ticket.filter
            ),
            CommitOutcome::Failed => {
                if let Err(err) = &result {
                    self.ctx
                        .notify_error(R::NAME, format!("Could not load {}", R::NAME), err);
                }
            }
        }
        result
    }

    pub async fn reload(&self) -> ApiResult<Vec<R::Entity>> {
        let filter = self.filter();
        self.load(filter).await
    }

    /// Switches filter locally to an empty list, superseding in-flight loads.
    pub fn reset(&self, filter: R::Filter) {
        self.state().reset(filter, Vec::new());
    }

    pub fn snapshot(&self) -> Snapshot<R::Filter, Vec<R::Entity>> {
        self.state().snapshot()
    }

    pub fn items(&self) -> Vec<R::Entity> {
        self.state().value().clone()
    }

    pub fn filter(&self) -> R::Filter {
        self.state().filter().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    pub fn find(&self, id: EntityId) -> Option<R::Entity> {
        self.state().find(id)
    }

    async fn send_authenticated<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let token = self.ctx.session.require_token()?;
        self.ctx.api.execute(request.bearer(token)).await
    }

    /// Reconciles with the server after a successful mutation.
    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.reload().await {
            debug!(
                "event=resource_refresh module={} status=error error={}",
                R::NAME,
                err
            );
        }
    }
}

impl<R: Creatable> ResourceController<R> {
    /// Creates an entity under the current filter, then reloads.
    pub async fn create(&self, draft: &R::Draft) -> ApiResult<R::Entity> {
        let filter = self.filter();
        let result = match R::create_request(&filter, draft) {
            Ok(request) => self.send_authenticated::<R::Entity>(request).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(created) => {
                info!(
                    "event=resource_create module={} status=ok id={}",
                    R::NAME,
                    created.id()
                );
                self.ctx.notify_success(
                    format!("{} created", R::LABEL),
                    format!("{} created successfully", R::LABEL),
                );
                self.refresh_after_mutation().await;
                Ok(created)
            }
            Err(err) => {
                self.ctx
                    .notify_error(R::NAME, format!("Could not create {}", R::NAME), &err);
                Err(err)
            }
        }
    }
}

impl<R: Updatable> ResourceController<R> {
    /// Sends the replacement or patch for `id`, then reloads.
    pub async fn update(&self, id: EntityId, patch: &R::Patch) -> ApiResult<R::Entity> {
        let result = match R::update_request(id, patch) {
            Ok(request) => self.send_authenticated::<R::Entity>(request).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(updated) => {
                info!("event=resource_update module={} status=ok id={}", R::NAME, id);
                self.ctx.notify_success(
                    format!("{} updated", R::LABEL),
                    format!("{} updated successfully", R::LABEL),
                );
                self.refresh_after_mutation().await;
                Ok(updated)
            }
            Err(err) => {
                self.ctx
                    .notify_error(R::NAME, format!("Could not update {}", R::NAME), &err);
                Err(err)
            }
        }
    }
}

impl<R: Deletable> ResourceController<R> {
    /// Deletes `id` after confirmation and drops it from the local list.
    pub async fn delete(&self, id: EntityId, confirm: &dyn Confirm) -> ApiResult<DeleteOutcome> {
        if !confirm.confirm(R::DELETE_PROMPT) {
            debug!(
                "event=resource_delete module={} status=declined id={}",
                R::NAME,
                id
            );
            return Ok(DeleteOutcome::Declined);
        }

        let result = match self.ctx.session.require_token() {
            Ok(token) => {
                self.ctx
                    .api
                    .execute_unit(R::delete_request(id).bearer(token))
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                let superseded = self.state().remove(id);
                info!("event=resource_delete module={} status=ok id={}", R::NAME, id);
                self.ctx.notify_success(
                    format!("{} deleted", R::LABEL),
                    format!("{} deleted successfully", R::LABEL),
                );
                if superseded {
                    // Replace superseded fetches with one issued after the delete.
                    if let Err(err) = self.reload().await {
                        debug!(
                            "event=resource_delete module={} status=reload_failed id={} error={}",
                            R::NAME,
                            id,
                            err
                        );
                    }
                }
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                self.ctx
                    .notify_error(R::NAME, format!("Could not delete {}", R::NAME), &err);
                Err(err)
            }
        }
    }
}
