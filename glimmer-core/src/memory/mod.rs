//! Durable memory: the persisted record and the system that mutates it.
//!
//! Trust is the only state that survives a session. It grows with
//! feedings and daily visits, shrinks with rough handling, and fades by a
//! point per day of absence (see [`crate::decay`]).

pub mod record;
pub mod system;

pub use record::MemoryRecord;
pub use system::{InteractionKind, MemorySystem};
