//! Debounced user search for the group member picker.
//!
//! # Invariants
//! - Queries shorter than the minimum clear results locally; no request.
//! - Each keystroke restarts the quiet period; only the latest query is sent.
//! - Results for a query other than the current one are discarded.

use super::{CommitOutcome, ControllerContext, Synced};
use crate::config::ClientConfig;
use crate::model::user::UserSummary;
use crate::transport::ApiResult;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

const MODULE: &str = "member_search";

struct SearchInner {
    ctx: ControllerContext,
    debounce: Duration,
    min_chars: usize,
    state: Mutex<Synced<String, Vec<UserSummary>>>,
}

impl SearchInner {
    fn state(&self) -> MutexGuard<'_, Synced<String, Vec<UserSummary>>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, query: String) {
        let ticket = self.state().begin(query);
        let result: ApiResult<Vec<UserSummary>> = match self.ctx.session.require_token() {
            Ok(token) => self.ctx.api.search_users(&ticket.filter, &token).await,
            Err(err) => Err(err),
        };

        let outcome = self.state().finish(&ticket, &result);
        match (outcome, result) {
            (CommitOutcome::Failed, Err(err)) => {
                self.ctx
                    .notify_error(MODULE, "Could not search users".to_string(), &err);
            }
            (outcome, _) => debug!(
                "event=member_search module=controller status={:?} generation={}",
                outcome, ticket.generation
            ),
        }
    }
}

pub struct MemberSearch {
    inner: Arc<SearchInner>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl MemberSearch {
    pub fn new(ctx: ControllerContext, config: &ClientConfig) -> Self {
        Self {
            inner: Arc::new(SearchInner {
                ctx,
                debounce: config.search_debounce,
                min_chars: config.search_min_chars,
                state: Mutex::new(Synced::new(String::new(), Vec::new())),
            }),
            timer: Mutex::new(None),
        }
    }

    fn timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a keystroke. Must be called inside a tokio runtime.
    pub fn set_query(&self, query: &str) {
        let query = query.trim().to_string();
        let mut timer = self.timer();
        if let Some(pending) = timer.take() {
            pending.abort();
        }

        if query.chars().count() < self.inner.min_chars {
            self.inner.state().reset(query, Vec::new());
            return;
        }

        self.inner.state().retarget(query.clone());
        let inner = Arc::clone(&self.inner);
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            // Detached: aborting the timer must not cancel a request already sent.
            let fetch = tokio::spawn(async move { inner.run(query).await });
            let _ = fetch.await;
        }));
    }

    /// Waits until the latest scheduled search has completed.
    pub async fn settle(&self) {
        let pending = self.timer().take();
        if let Some(handle) = pending {
            let _ = handle.await;
        }
    }

    pub fn clear(&self) {
        if let Some(pending) = self.timer().take() {
            pending.abort();
        }
        self.inner.state().reset(String::new(), Vec::new());
    }

    pub fn query(&self) -> String {
        self.inner.state().filter().clone()
    }

    pub fn results(&self) -> Vec<UserSummary> {
        self.inner.state().value().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state().is_loading()
    }
}

impl Drop for MemberSearch {
    fn drop(&mut self) {
        if let Some(pending) = self.timer().take() {
            pending.abort();
        }
    }
}
