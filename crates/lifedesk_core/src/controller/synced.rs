//! Generation-tagged cache slot shared by every controller.
//!
//! # Invariants
//! - `value` only ever holds the result of a fetch issued for the filter that
//!   is current when the fetch completes.
//! - A fetch older than the last committed one never overwrites it.

use crate::model::{EntityId, Identified};
use crate::transport::{ApiError, ApiResult};

/// Handed out by `begin`; presented back to `finish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket<F> {
    pub generation: u64,
    pub filter: F,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Current fetch failed; the previous value is kept.
    Failed,
    /// Superseded by a filter change or a newer commit.
    Discarded,
}

/// Point-in-time copy for a view.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<F, T> {
    pub value: T,
    pub filter: F,
    pub loading: bool,
    pub last_error: Option<ApiError>,
}

#[derive(Debug)]
pub struct Synced<F, T> {
    value: T,
    filter: F,
    issued: u64,
    committed: u64,
    in_flight: usize,
    last_error: Option<ApiError>,
}

impl<F, T> Synced<F, T>
where
    F: Clone + PartialEq,
    T: Clone,
{
    pub fn new(filter: F, value: T) -> Self {
        Self {
            value,
            filter,
            issued: 0,
            committed: 0,
            in_flight: 0,
            last_error: None,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Makes `filter` current and tags a new fetch for it.
    pub fn begin(&mut self, filter: F) -> LoadTicket<F> {
        self.filter = filter.clone();
        self.issued += 1;
        self.in_flight += 1;
        LoadTicket {
            generation: self.issued,
            filter,
        }
    }

    pub fn finish(&mut self, ticket: &LoadTicket<F>, result: &ApiResult<T>) -> CommitOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket.filter != self.filter || ticket.generation <= self.committed {
            return CommitOutcome::Discarded;
        }
        match result {
            Ok(value) => {
                self.value = value.clone();
                self.committed = ticket.generation;
                self.last_error = None;
                CommitOutcome::Committed
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                CommitOutcome::Failed
            }
        }
    }

    /// Changes the current filter without fetching; in-flight fetches for
    /// other filters will be discarded.
    pub fn retarget(&mut self, filter: F) {
        self.filter = filter;
    }

    /// Sets filter and value locally and supersedes everything in flight.
    pub fn reset(&mut self, filter: F, value: T) {
        self.filter = filter;
        self.value = value;
        self.issued += 1;
        self.committed = self.issued;
        self.last_error = None;
    }

    pub fn snapshot(&self) -> Snapshot<F, T> {
        Snapshot {
            value: self.value.clone(),
            filter: self.filter.clone(),
            loading: self.is_loading(),
            last_error: self.last_error.clone(),
        }
    }
}

impl<F, E> Synced<F, Vec<E>>
where
    F: Clone + PartialEq,
    E: Clone + Identified,
{
    /// Drops one row locally and supersedes every fetch issued before the
    /// removal. Returns whether one of those fetches is still in flight.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.value.retain(|item| item.id() != id);
        self.committed = self.issued;
        self.in_flight > 0
    }

    pub fn find(&self, id: EntityId) -> Option<E> {
        self.value.iter().find(|item| item.id() == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{CommitOutcome, Synced};
    use crate::model::{EntityId, Identified};
    use crate::transport::ApiError;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(EntityId);

    impl Identified for Row {
        fn id(&self) -> EntityId {
            self.0
        }
    }

    fn row(id: EntityId) -> Row {
        Row(id)
    }

    #[test]
    fn newer_commit_wins_over_late_older_response() {
        let mut slot = Synced::new("a", 0);
        let first = slot.begin("a");
        let second = slot.begin("a");

        assert_eq!(slot.finish(&second, &Ok(2)), CommitOutcome::Committed);
        assert_eq!(slot.finish(&first, &Ok(1)), CommitOutcome::Discarded);
        assert_eq!(*slot.value(), 2);
        assert!(!slot.is_loading());
    }

    #[test]
    fn response_for_replaced_filter_is_discarded() {
        let mut slot = Synced::new("a", 0);
        let old = slot.begin("a");
        let new = slot.begin("b");

        assert_eq!(slot.finish(&old, &Ok(1)), CommitOutcome::Discarded);
        assert_eq!(*slot.value(), 0);
        assert!(slot.is_loading());
        assert_eq!(slot.finish(&new, &Ok(2)), CommitOutcome::Committed);
        assert_eq!(*slot.value(), 2);
    }

    #[test]
    fn failure_keeps_value_and_records_error() {
        let mut slot = Synced::new("a", 7);
        let ticket = slot.begin("a");
        let outcome = slot.finish(&ticket, &Err(ApiError::transport("offline")));
        assert_eq!(outcome, CommitOutcome::Failed);
        assert_eq!(*slot.value(), 7);
        assert!(slot.last_error().is_some());
    }

    #[test]
    fn remove_supersedes_fetch_issued_before_it() {
        let mut slot = Synced::new("a", vec![row(1), row(2)]);
        let ticket = slot.begin("a");

        assert!(slot.remove(1));
        assert_eq!(
            slot.finish(&ticket, &Ok(vec![row(1), row(2)])),
            CommitOutcome::Discarded
        );
        assert_eq!(slot.value(), &vec![row(2)]);
        assert!(!slot.remove(2));
        assert!(slot.value().is_empty());
    }

    #[test]
    fn reset_supersedes_in_flight_fetch() {
        let mut slot = Synced::new("a", 0);
        let ticket = slot.begin("a");
        slot.reset("a", 5);
        assert_eq!(slot.finish(&ticket, &Ok(1)), CommitOutcome::Discarded);
        assert_eq!(*slot.value(), 5);
    }
}
