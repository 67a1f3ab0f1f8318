//! The per-tick update, in a fixed order.
//!
//! ## Tick order
//!
//! | Step | System                                   |
//! |------|------------------------------------------|
//! | 3    | Emotion update (plus movement trust)     |
//! | 4    | Expression smoothing                     |
//! | 5    | Food and bubbles; consumption reaction   |
//! | 6    | Mood policy and memory recall            |
//! | 7    | Physics and wall bounces                 |
//! | 8    | Ripples and ambient bubbles              |
//! | 9    | Trail sample                             |
//!
//! Steps 1-2 (frame timing, pause) and 10-11 (snapshot, scheduling) belong
//! to the engine.

use glimmer_core::behavior::{self, BehaviorContext, MemoryRecall};
use glimmer_core::config::GlimmerConfig;
use glimmer_core::creature::CreatureState;
use glimmer_core::emotion::{EmotionContext, EmotionEngine, MoodTransition};
use glimmer_core::memory::MemorySystem;
use glimmer_core::particles::ParticleSystem;
use glimmer_core::physics;
use glimmer_core::types::{BubbleKind, Bounds, Mood, Vec2};
use rand::rngs::StdRng;
use tracing::debug;

use crate::events::CursorTracker;

/// Nominal frame length; `dt = 1.0` is one of these.
pub const FRAME_MS: f32 = 1_000.0 / 60.0;

/// Everything the loop owns and mutates.
pub struct World {
    /// Tunables.
    pub config: GlimmerConfig,
    /// Swimming area.
    pub bounds: Bounds,
    /// The fish.
    pub creature: CreatureState,
    /// Food, bubbles and ripples.
    pub particles: ParticleSystem,
    /// Mood state machine.
    pub emotion: EmotionEngine,
    /// Persisted trust.
    pub memory: MemorySystem,
    /// Feeding-spot recall.
    pub recall: MemoryRecall,
    /// Live pointer.
    pub cursor: CursorTracker,
    /// Randomness for spawns and policies.
    pub rng: StdRng,
    /// Wall clock when the world was built (epoch ms).
    pub started_ms: i64,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("bounds", &self.bounds)
            .field("mood", &self.emotion.mood())
            .field("trust", &self.memory.trust_level())
            .field("food", &self.particles.food().len())
            .finish_non_exhaustive()
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Mood change caused by the rules or a consumption override.
    pub transition: Option<MoodTransition>,
    /// Where food was eaten, if it was.
    pub consumed: Option<Vec2>,
    /// Whether memory recall steered the creature.
    pub recalling: bool,
    /// Whether the creature touched a wall.
    pub bounced: bool,
}

/// Convert a frame delta to physics frames.
#[must_use]
pub fn frames(delta_ms: f32) -> f32 {
    delta_ms.max(0.0) / FRAME_MS
}

/// Run steps 3 through 9 of a tick.
pub fn tick(world: &mut World, delta_ms: f32, now_ms: i64) -> TickReport {
    let dt = frames(delta_ms);
    let mut report = TickReport::default();

    // 3. Emotion.
    if world.cursor.moved() {
        let e = &world.config.emotion;
        world.memory.nudge_for_movement(
            world.cursor.speed(),
            (e.playful_speed_min, e.playful_speed_max),
            e.startle_speed,
        );
    }
    let ctx = EmotionContext {
        trust_level: world.memory.trust_level(),
        time_since_last_interaction_ms: world.memory.time_since_last_interaction(),
        cursor_present: world.cursor.present(),
        cursor_speed: world.cursor.speed(),
    };
    report.transition = world.emotion.update(delta_ms, &ctx);

    // 4. Expression.
    let state = *world.emotion.state();
    physics::smooth_expression(
        &mut world.creature,
        state.mood,
        state.intensity,
        world.memory.trust_level(),
        dt,
        &world.config.creature,
    );

    // 5. Particles and consumption.
    report.consumed = world
        .particles
        .update(dt, world.creature.position, now_ms, &world.bounds);
    if let Some(at) = report.consumed {
        on_consumed(world, at, now_ms, &mut report);
    }
    world.emotion.finish_tick();

    // 6. Behavior.
    let mood = world.emotion.mood();
    #[allow(clippy::cast_precision_loss)]
    let time_s = now_ms.saturating_sub(world.started_ms) as f32 / 1_000.0;
    let ctx = BehaviorContext {
        position: world.creature.position,
        velocity: world.creature.velocity,
        cursor: world.cursor.position(),
        bounds: world.bounds,
        trust: world.memory.trust_level(),
        time_s,
        nearest_food: world.particles.nearest_food(world.creature.position),
        dart_cooldown: world.creature.dart_cooldown,
        sigh_chance: world.config.particles.sigh_chance,
        config: &world.config.creature,
    };
    let mut steering = behavior::steer(mood, &ctx, &mut world.rng);
    report.recalling = world.recall.apply(
        &mut steering,
        world.creature.position,
        world.particles.has_food(),
        now_ms.saturating_sub(world.creature.last_fed_ms),
        world.memory.feeding_spots(),
        world.config.creature.idle_speed,
        &world.config.memory,
        &mut world.rng,
    );
    world.creature.target_velocity = steering.target_velocity;
    world.creature.pattern = steering.pattern;
    if let Some(cooldown) = steering.dart_cooldown {
        world.creature.dart_cooldown = cooldown;
    }

    // 7. Physics.
    report.bounced = physics::integrate(
        &mut world.creature,
        mood,
        world.emotion.state().transition_speed,
        dt,
        &world.bounds,
        &world.config.creature,
    );

    // 8. Ripples and ambient bubbles.
    world.particles.update_ripples(dt);
    if let Some(kind) = steering.bubble {
        world
            .particles
            .add_bubble(world.creature.position, kind, &mut world.rng);
    }

    // 9. Trail.
    world.creature.push_trail();

    world.cursor.settle(dt);
    report
}

fn on_consumed(world: &mut World, at: Vec2, now_ms: i64, report: &mut TickReport) {
    world.memory.record_feeding(at);
    if let Some(t) = world.emotion.force(Mood::Excited, 1.0) {
        report.transition = Some(t);
    }
    world.particles.burst(
        at,
        BubbleKind::Sparkle,
        world.config.particles.celebration_bubbles,
        &mut world.rng,
    );
    world.creature.last_fed_ms = now_ms;
    world.recall.forget();
    debug!(
        x = at.x,
        y = at.y,
        trust = world.memory.trust_level(),
        "Creature ate"
    );
}
