//! Client core for the LifeDesk productivity app.
//!
//! Session handling, backend transport, per-domain resource caches and the
//! authentication gate. Views sit on top and own no invariants.

pub mod config;
pub mod controller;
pub mod db;
pub mod gate;
pub mod logging;
pub mod model;
pub mod notify;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use controller::{
    ControllerContext, DeleteOutcome, ExpensesController, GroupsController, MemberSearch,
    NotesController, ProblemsController, ResourceController, TagsController, TodosController,
};
pub use gate::{resolve, Route, RouteDecision};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::{EntityId, Identified};
pub use notify::{Confirm, LogNotifier, Notification, NotificationLevel, Notifier};
pub use session::{
    SessionError, SessionReader, SessionState, SessionStore, SqliteSessionStorage,
};
pub use transport::{ApiClient, ApiError, ApiErrorKind, ApiResult, Credentials};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
