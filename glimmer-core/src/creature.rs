//! The creature's per-session body state.

use std::collections::VecDeque;

use serde::Serialize;

use crate::types::{SwimPattern, Vec2};

/// Cosmetic attributes smoothed toward mood targets each tick. They are
/// presentation only and never feed back into decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Expression {
    /// Pupil size in `[0, 1]`.
    pub eye_dilation: f32,
    /// Fin extension in `[0, 1]`.
    pub fin_spread: f32,
    /// Muscle tension in `[0, 1]`.
    pub body_tension: f32,
}

impl Default for Expression {
    fn default() -> Self {
        Self {
            eye_dilation: 0.5,
            fin_spread: 0.5,
            body_tension: 0.3,
        }
    }
}

/// Position, motion and presentation state of the creature.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureState {
    /// Current position.
    pub position: Vec2,
    /// Current velocity (units per frame).
    pub velocity: Vec2,
    /// Velocity the behavior policy asked for.
    pub target_velocity: Vec2,
    /// Heading in radians.
    pub angle: f32,
    /// Body glow in `[0, 1]`.
    pub glow: f32,
    /// Frames until the next excited burst is allowed.
    pub dart_cooldown: f32,
    /// Eyes, fins and tension.
    pub expression: Expression,
    /// What the creature is currently doing.
    pub pattern: SwimPattern,
    /// Wall-clock time of the last meal (epoch ms).
    pub last_fed_ms: i64,
    trail: VecDeque<Vec2>,
    trail_capacity: usize,
}

impl CreatureState {
    /// A creature at rest at `position`.
    #[must_use]
    pub fn new(position: Vec2, now_ms: i64, trail_capacity: usize) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            target_velocity: Vec2::ZERO,
            angle: 0.0,
            glow: 0.5,
            dart_cooldown: 0.0,
            expression: Expression::default(),
            pattern: SwimPattern::Wander,
            last_fed_ms: now_ms,
            trail: VecDeque::with_capacity(trail_capacity),
            trail_capacity,
        }
    }

    /// Past positions, oldest first.
    pub fn trail(&self) -> impl ExactSizeIterator<Item = &Vec2> {
        self.trail.iter()
    }

    /// Record the current position, dropping the oldest sample when full.
    pub fn push_trail(&mut self) {
        if self.trail_capacity == 0 {
            return;
        }
        if self.trail.len() == self.trail_capacity {
            self.trail.pop_front();
        }
        self.trail.push_back(self.position);
    }

    /// Bring the creature to a stop in place.
    pub fn rest(&mut self) {
        self.velocity = Vec2::ZERO;
        self.target_velocity = Vec2::ZERO;
        self.pattern = SwimPattern::Rest;
    }

    /// Move to `position` at rest and forget the trail.
    pub fn respawn(&mut self, position: Vec2) {
        self.position = position;
        self.rest();
        self.angle = 0.0;
        self.trail.clear();
    }

    /// Whether every simulated quantity is a real number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.target_velocity.is_finite()
            && self.angle.is_finite()
            && self.glow.is_finite()
    }
}
