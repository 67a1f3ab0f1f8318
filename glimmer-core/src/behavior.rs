//! Mood-driven steering.
//!
//! Each mood owns one policy: a plain function from the current
//! [`BehaviorContext`] to a [`Steering`] decision. Policies live in a table
//! indexed by [`Mood::index`], so adding a mood means adding a row, not a
//! type. Nothing here mutates the creature; the loop applies the result.
//!
//! | Mood     | Cursor near              | Otherwise                   |
//! |----------|--------------------------|-----------------------------|
//! | curious  | approach at 150..300     | sinusoidal wander           |
//! | playful  | figure eight within 100  | pursuit at 2x idle speed    |
//! | shy      | retreat to a corner      | slide along the nearest wall|
//! | excited  | dart at the nearest food | cooldown-gated bursts       |
//! | trusting | follow at trust distance | hover                       |
//! | lonely   | slow drift, rare sighs   | slow drift, rare sighs      |

use rand::{Rng, RngCore};
use tracing::debug;

use crate::config::{CreatureConfig, MemoryConfig};
use crate::types::{Bounds, BubbleKind, Mood, Point, SwimPattern, Vec2};

/// Cursor distance band in which a curious creature edges closer.
const APPROACH_BAND: (f32, f32) = (150.0, 300.0);
/// Cursor distance under which a playful creature orbits instead of chasing.
const ORBIT_RADIUS: f32 = 100.0;
/// Closest a trusting creature will follow, at full trust.
const MIN_FOLLOW_DISTANCE: f32 = 30.0;
/// Follow distance at zero trust.
const MAX_FOLLOW_DISTANCE: f32 = 130.0;
/// Excited burst cooldown range, in frames.
const BURST_COOLDOWN: (f32, f32) = (60.0, 150.0);
/// A remembered spot closer than this counts as visited.
const RECALL_REACHED: f32 = 20.0;

/// Everything a policy may look at. Built fresh every tick.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorContext<'a> {
    /// Creature position.
    pub position: Vec2,
    /// Creature velocity.
    pub velocity: Vec2,
    /// Cursor position, if the pointer is over the surface.
    pub cursor: Option<Vec2>,
    /// Swimming area.
    pub bounds: Bounds,
    /// Current trust in `[0, 100]`.
    pub trust: f32,
    /// Seconds since the engine started, drives the periodic motions.
    pub time_s: f32,
    /// Closest uneaten food, if any.
    pub nearest_food: Option<Vec2>,
    /// Frames left before the next excited burst.
    pub dart_cooldown: f32,
    /// Chance per tick of a lonely sigh bubble.
    pub sigh_chance: f64,
    /// Speeds and margins.
    pub config: &'a CreatureConfig,
}

impl BehaviorContext<'_> {
    fn to_cursor(&self) -> Option<(Vec2, f32)> {
        self.cursor.map(|c| {
            let offset = c - self.position;
            (offset, offset.length())
        })
    }
}

/// A policy's decision for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    /// Velocity the physics should chase.
    pub target_velocity: Vec2,
    /// Pattern tag for the snapshot and memory.
    pub pattern: SwimPattern,
    /// New dart cooldown, when the policy started a burst.
    pub dart_cooldown: Option<f32>,
    /// Ambient bubble to emit at the creature's position.
    pub bubble: Option<BubbleKind>,
}

impl Steering {
    fn new(target_velocity: Vec2, pattern: SwimPattern) -> Self {
        Self {
            target_velocity,
            pattern,
            dart_cooldown: None,
            bubble: None,
        }
    }
}

/// Signature shared by every mood policy.
pub type Policy = fn(&BehaviorContext<'_>, &mut dyn RngCore) -> Steering;

/// Policies in [`Mood::ALL`] order.
const POLICIES: [Policy; Mood::COUNT] = [curious, playful, shy, excited, trusting, lonely];

/// The policy for `mood`.
#[must_use]
pub fn policy_for(mood: Mood) -> Policy {
    POLICIES[mood.index()]
}

/// Run the active mood's policy.
pub fn steer(mood: Mood, ctx: &BehaviorContext<'_>, rng: &mut dyn RngCore) -> Steering {
    policy_for(mood)(ctx, rng)
}

fn wander(ctx: &BehaviorContext<'_>, speed: f32, amplitude: f32) -> Vec2 {
    let t = ctx.time_s;
    Vec2::new((t * 0.5).cos() + 0.3 * (t * 1.7).sin(), amplitude * (t * 0.9).sin()) * speed
}

fn curious(ctx: &BehaviorContext<'_>, _rng: &mut dyn RngCore) -> Steering {
    let idle = ctx.config.idle_speed;
    if let Some((offset, dist)) = ctx.to_cursor() {
        if dist > APPROACH_BAND.0 && dist < APPROACH_BAND.1 {
            // Slow down as the gap closes.
            let eagerness = (dist - APPROACH_BAND.0) / (APPROACH_BAND.1 - APPROACH_BAND.0);
            let v = offset / dist * idle * (0.4 + 0.6 * eagerness);
            return Steering::new(v, SwimPattern::Approach);
        }
    }
    Steering::new(wander(ctx, idle, 0.6), SwimPattern::Wander)
}

fn playful(ctx: &BehaviorContext<'_>, _rng: &mut dyn RngCore) -> Steering {
    let fast = ctx.config.idle_speed * 2.0;
    match ctx.to_cursor() {
        Some((offset, dist)) if dist < ORBIT_RADIUS => {
            let t = ctx.time_s * 2.0;
            let lobe = Vec2::new(t.sin(), (2.0 * t).sin() * 0.5) * (ORBIT_RADIUS * 0.6);
            let aim = (offset + lobe) * 0.08;
            Steering::new(aim.clamp_length_max(fast), SwimPattern::Orbit)
        }
        Some((offset, dist)) => Steering::new(offset / dist * fast, SwimPattern::Pursue),
        None => Steering::new(wander(ctx, fast, 1.0), SwimPattern::Wander),
    }
}

fn shy(ctx: &BehaviorContext<'_>, _rng: &mut dyn RngCore) -> Steering {
    let idle = ctx.config.idle_speed;
    let inset = ctx.config.boundary_margin;

    if let Some(cursor) = ctx.cursor {
        let corner = hiding_corner(ctx, cursor, inset);
        let v = (corner - ctx.position).normalize_or_zero() * idle * 1.5;
        return Steering::new(v, SwimPattern::Retreat);
    }

    let edge = ctx.bounds.nearest_edge_point(ctx.position, inset);
    let radial = (ctx.position - ctx.bounds.center()).normalize_or_zero();
    let along = radial.perp() * idle * 0.4;
    let pull = (edge - ctx.position) * 0.01;
    Steering::new((along + pull).clamp_length_max(idle), SwimPattern::EdgeHug)
}

/// Nearest corner that lies farther from the pointer than the creature
/// does. When every corner is closer to the pointer, the one farthest from
/// it. Ties go to the corner farther from the pointer.
fn hiding_corner(ctx: &BehaviorContext<'_>, cursor: Vec2, inset: f32) -> Vec2 {
    let corners = ctx.bounds.corners(inset);
    let exposure = ctx.position.distance(cursor);
    let away = corners
        .iter()
        .copied()
        .filter(|c| c.distance(cursor) > exposure)
        .min_by(|a, b| {
            a.distance(ctx.position)
                .total_cmp(&b.distance(ctx.position))
                .then_with(|| b.distance(cursor).total_cmp(&a.distance(cursor)))
        });
    away.unwrap_or_else(|| {
        corners
            .into_iter()
            .max_by(|a, b| a.distance(cursor).total_cmp(&b.distance(cursor)))
            .unwrap_or(ctx.position)
    })
}

fn excited(ctx: &BehaviorContext<'_>, rng: &mut dyn RngCore) -> Steering {
    let dash = ctx.config.max_speed * Mood::Excited.speed_cap_factor();

    if let Some(food) = ctx.nearest_food {
        let v = (food - ctx.position).normalize_or_zero() * dash;
        return Steering::new(v, SwimPattern::Dart);
    }

    if ctx.dart_cooldown <= 0.0 {
        let heading = rng.gen_range(0.0..std::f32::consts::TAU);
        let mut s = Steering::new(Vec2::from_angle(heading) * dash, SwimPattern::Burst);
        s.dart_cooldown = Some(rng.gen_range(BURST_COOLDOWN.0..BURST_COOLDOWN.1));
        return s;
    }

    // Coast between bursts.
    Steering::new(ctx.velocity * 0.95, SwimPattern::Burst)
}

fn trusting(ctx: &BehaviorContext<'_>, _rng: &mut dyn RngCore) -> Steering {
    let idle = ctx.config.idle_speed;
    let Some((offset, dist)) = ctx.to_cursor() else {
        return Steering::new(wander(ctx, idle * 0.5, 0.4), SwimPattern::Hover);
    };

    let closeness = (ctx.trust / 100.0).clamp(0.0, 1.0);
    let follow = MAX_FOLLOW_DISTANCE - (MAX_FOLLOW_DISTANCE - MIN_FOLLOW_DISTANCE) * closeness;
    if dist > follow {
        let urgency = ((dist - follow) / 50.0).min(1.0);
        let v = offset / dist * idle * 1.5 * urgency;
        Steering::new(v, SwimPattern::Follow)
    } else {
        Steering::new(ctx.velocity * 0.5, SwimPattern::Hover)
    }
}

fn lonely(ctx: &BehaviorContext<'_>, rng: &mut dyn RngCore) -> Steering {
    let mut s = Steering::new(wander(ctx, ctx.config.idle_speed * 0.3, 0.3), SwimPattern::Drift);
    if ctx.sigh_chance > 0.0 && rng.gen_bool(ctx.sigh_chance.min(1.0)) {
        s.bubble = Some(BubbleKind::Sigh);
    }
    s
}

/// Pulls a hungry creature back toward places it was fed before.
///
/// Engages once no food is in the water and enough time has passed since
/// the last meal. A remembered spot is picked at random and kept until it
/// is reached or the creature eats.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecall {
    target: Option<Vec2>,
}

impl MemoryRecall {
    /// Spot currently being revisited.
    #[must_use]
    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Drop the current goal.
    pub fn forget(&mut self) {
        self.target = None;
    }

    /// Blend the recall pull into `steering`. Returns whether a spot is
    /// being pursued.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &mut self,
        steering: &mut Steering,
        position: Vec2,
        food_present: bool,
        since_fed_ms: i64,
        spots: &[Point],
        idle_speed: f32,
        config: &MemoryConfig,
        rng: &mut dyn RngCore,
    ) -> bool {
        if food_present || since_fed_ms < config.recall_after_ms {
            self.target = None;
            return false;
        }

        if let Some(t) = self.target {
            if t.distance(position) < RECALL_REACHED {
                debug!(x = t.x, y = t.y, "Remembered feeding spot reached");
                self.target = None;
            }
        }

        if self.target.is_none() && !spots.is_empty() {
            let spot = spots[rng.gen_range(0..spots.len())];
            self.target = Some(spot.into());
        }

        let Some(t) = self.target else {
            return false;
        };
        let pull = (t - position).normalize_or_zero() * idle_speed;
        steering.target_velocity = steering.target_velocity.lerp(pull, config.recall_strength);
        true
    }
}
