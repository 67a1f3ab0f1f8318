//! # Glimmer Core Library
//!
//! Host-agnostic simulation of a small glowing fish that remembers who
//! feeds it.
//!
//! - **Emotion**: a prioritized rule table that picks one of six moods
//!   each tick from trust, idle time and the live pointer.
//! - **Memory**: a persisted trust score that grows with feedings and
//!   daily visits and fades by a point per day of absence.
//! - **Particles**: food pellets, bubbles and ripples.
//! - **Behavior**: one steering policy per mood, dispatched by table.
//! - **Physics**: exponential velocity approach, mood speed caps and
//!   soft wall bounces.
//!
//! The frame loop that ties these together lives in `glimmer-host`.
//!
//! ## Performance Contract
//!
//! Every per-tick operation is `O(particles + trail length)` and never
//! blocks. Persistence happens only on trust-affecting events.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod behavior;
pub mod clock;
pub mod config;
pub mod creature;
pub mod decay;
pub mod emotion;
pub mod error;
pub mod memory;
pub mod particles;
pub mod persistence;
pub mod physics;
pub mod snapshot;
pub mod types;

pub use config::GlimmerConfig;
pub use error::GlimmerError;
pub use memory::{MemoryRecord, MemorySystem};
pub use snapshot::{CreatureStats, FrameSnapshot};
pub use types::*;
