//! Particle system: food pellets, bubbles and tap ripples.
//!
//! All particles are plain values; nothing points back at the creature.
//! Lists only grow through explicit spawns and shrink on consumption,
//! expiry, fading out or drifting off the surface.

use rand::{Rng, RngCore};
use serde::Serialize;
use tracing::debug;

use crate::config::ParticleConfig;
use crate::types::{BubbleKind, Bounds, Vec2};

/// Water drag applied to food velocity each frame.
const FOOD_DRAG: f32 = 0.98;
/// How far past the edges a particle may drift before it is culled.
const CULL_SLACK: f32 = 20.0;
/// Ripple growth per frame.
const RIPPLE_GROWTH: f32 = 1.5;
/// Ripple opacity lost per frame.
const RIPPLE_FADE: f32 = 0.02;

/// A sinking food pellet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodParticle {
    /// Current position.
    pub position: Vec2,
    /// Current velocity (units per frame).
    pub velocity: Vec2,
    /// Pellet radius.
    pub size: f32,
    /// Pulsing glow in `[0, 1]`.
    pub glow: f32,
    /// Fixed sparkle offsets relative to the pellet.
    pub sparkles: Vec<Vec2>,
    /// Set once the creature swallows it.
    pub consumed: bool,
    /// Wall-clock spawn time (epoch ms).
    pub created_at_ms: i64,
}

impl FoodParticle {
    fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.created_at_ms)
    }
}

/// A rising, fading bubble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleEffect {
    /// Current position.
    pub position: Vec2,
    /// Current velocity (units per frame, negative y rises).
    pub velocity: Vec2,
    /// Bubble radius.
    pub size: f32,
    /// Opacity in `[0, 1]`; the bubble is gone at zero.
    pub opacity: f32,
    /// Mood-derived style.
    pub kind: BubbleKind,
}

/// An expanding ring where the surface was tapped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RippleEffect {
    /// Center of the ring.
    pub position: Vec2,
    /// Current radius.
    pub radius: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Radius at which the ripple is discarded.
    pub max_radius: f32,
}

/// Owner of every transient particle.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    config: ParticleConfig,
    food: Vec<FoodParticle>,
    bubbles: Vec<BubbleEffect>,
    ripples: Vec<RippleEffect>,
}

impl ParticleSystem {
    /// Empty system.
    #[must_use]
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            config,
            food: Vec::new(),
            bubbles: Vec::new(),
            ripples: Vec::new(),
        }
    }

    /// Active food, in spawn order.
    #[must_use]
    pub fn food(&self) -> &[FoodParticle] {
        &self.food
    }

    /// Active bubbles.
    #[must_use]
    pub fn bubbles(&self) -> &[BubbleEffect] {
        &self.bubbles
    }

    /// Active ripples.
    #[must_use]
    pub fn ripples(&self) -> &[RippleEffect] {
        &self.ripples
    }

    /// Whether any uneaten food is in the water.
    #[must_use]
    pub fn has_food(&self) -> bool {
        self.food.iter().any(|f| !f.consumed)
    }

    /// Position of the uneaten food closest to `from`.
    #[must_use]
    pub fn nearest_food(&self, from: Vec2) -> Option<Vec2> {
        self.food
            .iter()
            .filter(|f| !f.consumed)
            .map(|f| f.position)
            .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
    }

    /// Drop a pellet at `position`. It drifts gently downward and carries a
    /// fixed constellation of sparkles.
    pub fn add_food(&mut self, position: Vec2, now_ms: i64, rng: &mut dyn RngCore) {
        let spread = self.config.sparkle_spread;
        let sparkles = (0..self.config.sparkle_count)
            .map(|_| {
                Vec2::new(
                    rng.gen_range(-spread..=spread),
                    rng.gen_range(-spread..=spread),
                )
            })
            .collect();

        self.food.push(FoodParticle {
            position,
            velocity: Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(0.5..1.0)),
            size: rng.gen_range(4.0..6.0),
            glow: 1.0,
            sparkles,
            consumed: false,
            created_at_ms: now_ms,
        });
        debug!(x = position.x, y = position.y, active = self.food.len(), "Food dropped");
    }

    /// Release a single bubble at `position`.
    pub fn add_bubble(&mut self, position: Vec2, kind: BubbleKind, rng: &mut dyn RngCore) {
        let rise = match kind {
            BubbleKind::Sigh => rng.gen_range(0.3..0.6),
            BubbleKind::Sparkle => rng.gen_range(1.0..2.0),
            _ => rng.gen_range(0.5..1.5),
        };
        self.bubbles.push(BubbleEffect {
            position,
            velocity: Vec2::new(rng.gen_range(-0.3..0.3), -rise),
            size: rng.gen_range(2.0..6.0),
            opacity: rng.gen_range(0.6..1.0),
            kind,
        });
    }

    /// Release `count` bubbles scattered around `position`.
    pub fn burst(&mut self, position: Vec2, kind: BubbleKind, count: usize, rng: &mut dyn RngCore) {
        for _ in 0..count {
            let jitter = Vec2::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            self.add_bubble(position + jitter, kind, rng);
        }
    }

    /// Start a ripple at `position`.
    pub fn add_ripple(&mut self, position: Vec2) {
        self.ripples.push(RippleEffect {
            position,
            radius: 0.0,
            opacity: 1.0,
            max_radius: self.config.ripple_max_radius,
        });
    }

    /// Advance food and bubbles by `dt` frames.
    ///
    /// The first uneaten pellet (in spawn order) within the mouth radius of
    /// `creature` is eaten and its position returned. Only one pellet is
    /// eaten per call even if several are in reach.
    pub fn update(&mut self, dt: f32, creature: Vec2, now_ms: i64, bounds: &Bounds) -> Option<Vec2> {
        let gravity = self.config.food_gravity;
        let drag = FOOD_DRAG.powf(dt);
        for food in &mut self.food {
            food.velocity.y += gravity * dt;
            food.velocity *= drag;
            food.position += food.velocity * dt;
            #[allow(clippy::cast_precision_loss)]
            let age_s = food.age_ms(now_ms) as f32 / 1_000.0;
            food.glow = 0.7 + 0.3 * (age_s * 4.0).sin();
        }

        let mouth_sq = self.config.mouth_radius * self.config.mouth_radius;
        let eaten = self
            .food
            .iter_mut()
            .find(|f| !f.consumed && f.position.distance_squared(creature) <= mouth_sq)
            .map(|f| {
                f.consumed = true;
                f.position
            });

        let ttl = self.config.food_ttl_ms;
        self.food.retain(|f| {
            !f.consumed && f.age_ms(now_ms) < ttl && bounds.contains(f.position, CULL_SLACK)
        });

        let fade = self.config.bubble_fade;
        for bubble in &mut self.bubbles {
            bubble.position += bubble.velocity * dt;
            bubble.opacity -= fade * dt;
        }
        self.bubbles
            .retain(|b| b.opacity > 0.0 && b.position.y > -CULL_SLACK);

        if let Some(at) = eaten {
            debug!(x = at.x, y = at.y, remaining = self.food.len(), "Food eaten");
        }
        eaten
    }

    /// Grow and fade ripples by `dt` frames.
    pub fn update_ripples(&mut self, dt: f32) {
        for ripple in &mut self.ripples {
            ripple.radius += RIPPLE_GROWTH * dt;
            ripple.opacity -= RIPPLE_FADE * dt;
        }
        self.ripples
            .retain(|r| r.opacity > 0.0 && r.radius <= r.max_radius);
    }

    /// Drop every particle.
    pub fn clear(&mut self) {
        self.food.clear();
        self.bubbles.clear();
        self.ripples.clear();
    }
}
