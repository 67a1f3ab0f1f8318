//! Input events the engine consumes, and the cursor tracker they feed.

use glimmer_core::types::Vec2;
use serde::{Deserialize, Serialize};

/// Per-frame decay of the tracked cursor speed when the pointer is still.
const SPEED_DECAY: f32 = 0.85;

/// Categories of input the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Pointer moved over the surface.
    PointerMove,
    /// Pointer pressed (click or tap).
    PointerDown,
    /// Pointer left the surface.
    PointerLeave,
    /// Page or surface visibility changed.
    Visibility,
}

impl InputKind {
    /// Everything the engine listens for.
    pub const ALL: [Self; 4] = [
        Self::PointerMove,
        Self::PointerDown,
        Self::PointerLeave,
        Self::Visibility,
    ];
}

/// A single input delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer moved to `position`.
    PointerMove {
        /// Surface coordinates.
        position: Vec2,
    },
    /// Pointer pressed at `position`: drops food and makes a ripple.
    PointerDown {
        /// Surface coordinates.
        position: Vec2,
    },
    /// Pointer left the surface.
    PointerLeave,
    /// Visibility changed.
    VisibilityChange {
        /// Whether the surface is now visible.
        visible: bool,
    },
}

impl InputEvent {
    /// Category of this event.
    #[must_use]
    pub fn kind(&self) -> InputKind {
        match self {
            Self::PointerMove { .. } => InputKind::PointerMove,
            Self::PointerDown { .. } => InputKind::PointerDown,
            Self::PointerLeave => InputKind::PointerLeave,
            Self::VisibilityChange { .. } => InputKind::Visibility,
        }
    }
}

/// Where the pointer is and how fast it is moving.
///
/// Speed is the distance covered between consecutive move events, which
/// hosts deliver about once per frame, so it reads as units per tick. It
/// decays while the pointer sits still.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorTracker {
    position: Option<Vec2>,
    speed: f32,
    moved: bool,
}

impl CursorTracker {
    /// Pointer position, if it is over the surface.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Whether the pointer is over the surface.
    #[must_use]
    pub fn present(&self) -> bool {
        self.position.is_some()
    }

    /// Current speed in units per tick.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Whether the pointer moved since the last [`settle`](Self::settle).
    #[must_use]
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Record a move. Returns `true` when the pointer just arrived.
    pub fn move_to(&mut self, position: Vec2) -> bool {
        let arrived = self.position.is_none();
        self.speed = self.position.map_or(0.0, |prev| prev.distance(position));
        self.position = Some(position);
        self.moved = true;
        arrived
    }

    /// The pointer left the surface.
    pub fn leave(&mut self) {
        *self = Self::default();
    }

    /// End-of-tick bookkeeping: clear the moved flag and let speed decay.
    pub fn settle(&mut self, dt: f32) {
        if !self.moved {
            self.speed *= SPEED_DECAY.powf(dt.max(0.0));
        }
        self.moved = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_move_arrives_with_zero_speed() {
        let mut c = CursorTracker::default();
        assert!(c.move_to(Vec2::new(10.0, 10.0)));
        assert!(c.speed().abs() < f32::EPSILON);
        assert!(!c.move_to(Vec2::new(40.0, 50.0)));
        assert!((c.speed() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn speed_decays_when_still() {
        let mut c = CursorTracker::default();
        c.move_to(Vec2::ZERO);
        c.move_to(Vec2::new(60.0, 0.0));
        c.settle(1.0);
        assert!((c.speed() - 60.0).abs() < 1e-4);
        c.settle(1.0);
        assert!(c.speed() < 60.0);
        assert!(!c.moved());
    }

    #[test]
    fn leave_forgets_everything() {
        let mut c = CursorTracker::default();
        c.move_to(Vec2::new(1.0, 1.0));
        c.leave();
        assert!(!c.present());
        assert!(c.position().is_none());
    }

    #[test]
    fn events_round_trip_through_json() {
        let e: InputEvent =
            serde_json::from_str(r#"{"type":"pointer_down","position":[3.0,4.0]}"#).expect("parse");
        assert_eq!(e, InputEvent::PointerDown { position: Vec2::new(3.0, 4.0) });
        assert_eq!(e.kind(), InputKind::PointerDown);
    }
}
