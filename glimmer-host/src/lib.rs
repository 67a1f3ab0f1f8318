//! # glimmer-host: Frame Loop and Host Seams
//!
//! This crate drives the host-agnostic `glimmer-core` simulation from
//! whatever environment embeds it: a browser shim, a game engine, or the
//! bundled headless binary.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                  Host                    │
//! │  frames ─┐   input ─┐        ┌─ renderer │
//! │  ┌───────▼──────────▼────────┴───────┐   │
//! │  │           glimmer-host            │   │
//! │  │  ┌──────────┐   ┌──────────────┐  │   │
//! │  │  │  Engine  │──▶│   systems    │  │   │
//! │  │  └──────────┘   └──────┬───────┘  │   │
//! │  │                        ▼          │   │
//! │  │        ┌─────────────────────┐    │   │
//! │  │        │    glimmer-core     │    │   │
//! │  │        └─────────────────────┘    │   │
//! │  └───────────────────────────────────┘   │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `engine`: lifecycle, frame timing, fault containment, public queries
//! - `systems`: the ordered per-tick update over a [`systems::World`]
//! - `events`: input events and the cursor tracker
//! - `hooks`: frame scheduler, input host and render sink traits

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod events;
pub mod hooks;
pub mod systems;

pub use engine::{Engine, EngineServices, EngineState};
pub use events::{InputEvent, InputKind};
