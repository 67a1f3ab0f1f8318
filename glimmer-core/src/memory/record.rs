//! The persisted memory record.
//!
//! Wire format (JSON, camelCase, epoch milliseconds):
//!
//! ```json
//! {
//!   "trustLevel": 42.5,
//!   "lastInteraction": 1700000000000,
//!   "feedingSpots": [{"x": 120.0, "y": 300.0}],
//!   "interactionCount": 17,
//!   "visitDates": [1699900000000, 1700000000000],
//!   "behaviorPattern": "wander"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::decay::clamp_trust;
use crate::types::Point;

/// Everything the creature remembers between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    /// Accumulated trust in `[0, 100]`.
    pub trust_level: f32,
    /// Epoch ms of the last trust-affecting interaction.
    pub last_interaction: i64,
    /// Where the creature has eaten, oldest first.
    #[serde(default)]
    pub feeding_spots: Vec<Point>,
    /// Total recorded interactions.
    #[serde(default)]
    pub interaction_count: u64,
    /// One epoch-ms timestamp per calendar day with at least one interaction.
    #[serde(default)]
    pub visit_dates: Vec<i64>,
    /// Last swim pattern tag seen at teardown.
    #[serde(default = "default_pattern")]
    pub behavior_pattern: String,
}

impl MemoryRecord {
    /// Record for a creature meeting someone for the first time at `now_ms`.
    #[must_use]
    pub fn fresh(initial_trust: f32, now_ms: i64) -> Self {
        Self {
            trust_level: clamp_trust(initial_trust),
            last_interaction: now_ms,
            feeding_spots: Vec::new(),
            interaction_count: 0,
            visit_dates: vec![now_ms],
            behavior_pattern: default_pattern(),
        }
    }

    /// Parse a stored record. Anything unparseable, with a non-finite trust
    /// value or with a pre-epoch interaction time counts as corrupt and
    /// yields `None`.
    #[must_use]
    pub fn parse(json: &str, max_feeding_spots: usize) -> Option<Self> {
        let mut record: Self = serde_json::from_str(json).ok()?;
        if !record.trust_level.is_finite() || record.last_interaction < 0 {
            return None;
        }
        record.trust_level = clamp_trust(record.trust_level);
        let excess = record.feeding_spots.len().saturating_sub(max_feeding_spots);
        record.feeding_spots.drain(..excess);
        Some(record)
    }

    /// Push a feeding spot, evicting the oldest beyond `max`.
    pub fn push_feeding_spot(&mut self, spot: Point, max: usize) {
        self.feeding_spots.push(spot);
        let excess = self.feeding_spots.len().saturating_sub(max);
        self.feeding_spots.drain(..excess);
    }
}

fn default_pattern() -> String {
    "wander".to_string()
}
