//! Typed client-side projections of backend resources.
//!
//! # Responsibility
//! - Define one explicit schema per resource so responses are validated at
//!   the transport boundary instead of trusted as-is.
//! - Hold transient form state and the notes selection chain.
//!
//! # Invariants
//! - The server is the source of truth; these records are read-only mirrors.
//! - Unknown response fields are ignored; missing required fields fail decode.

pub mod expense;
pub mod forms;
pub mod group;
pub mod notes;
pub mod problem;
pub mod selection;
pub mod todo;
pub mod user;

/// Server-assigned integer identifier shared by every resource.
pub type EntityId = i64;

/// Records that carry a stable server id.
pub trait Identified {
    fn id(&self) -> EntityId;
}
