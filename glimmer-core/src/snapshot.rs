//! Per-frame state handed to the renderer, and the stats summary.

use serde::Serialize;

use crate::creature::{CreatureState, Expression};
use crate::emotion::EmotionalState;
use crate::particles::{BubbleEffect, FoodParticle, ParticleSystem, RippleEffect};
use crate::types::{Mood, SwimPattern, Vec2};

/// Where the creature is and how it looks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose {
    /// Body position.
    pub position: Vec2,
    /// Heading in radians.
    pub angle: f32,
    /// Body glow in `[0, 1]`.
    pub glow: f32,
    /// Eyes, fins and tension.
    pub expression: Expression,
    /// Current swim pattern.
    pub pattern: SwimPattern,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    /// Frames emitted since the engine was built.
    pub frame: u64,
    /// The creature.
    pub pose: Pose,
    /// Recent positions, oldest first.
    pub trail: Vec<Vec2>,
    /// Active food pellets.
    pub food: Vec<FoodParticle>,
    /// Active bubbles.
    pub bubbles: Vec<BubbleEffect>,
    /// Active ripples.
    pub ripples: Vec<RippleEffect>,
    /// Current mood, for color and style.
    pub mood: Mood,
    /// Mood intensity in `[0, 1]`.
    pub intensity: f32,
    /// Current trust in `[0, 100]`.
    pub trust: f32,
    /// True when the simulation did not advance this frame.
    pub resting: bool,
}

impl FrameSnapshot {
    /// Copy out the current state.
    #[must_use]
    pub fn capture(
        frame: u64,
        creature: &CreatureState,
        particles: &ParticleSystem,
        emotion: &EmotionalState,
        trust: f32,
        resting: bool,
    ) -> Self {
        Self {
            frame,
            pose: Pose {
                position: creature.position,
                angle: creature.angle,
                glow: creature.glow,
                expression: creature.expression,
                pattern: creature.pattern,
            },
            trail: creature.trail().copied().collect(),
            food: particles.food().to_vec(),
            bubbles: particles.bubbles().to_vec(),
            ripples: particles.ripples().to_vec(),
            mood: emotion.mood,
            intensity: emotion.intensity,
            trust,
            resting,
        }
    }
}

/// Summary for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureStats {
    /// Current trust.
    pub trust: f32,
    /// Current mood.
    pub mood: Mood,
    /// Lifetime interaction count.
    pub interactions: u64,
    /// Number of remembered feeding spots.
    pub feeding_spots: usize,
    /// Milliseconds since the creature last ate.
    pub time_since_last_fed_ms: i64,
}
