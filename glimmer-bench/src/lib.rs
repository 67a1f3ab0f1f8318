//! Shared fixtures for the glimmer benchmarks.

use std::rc::Rc;

use glimmer_core::behavior::MemoryRecall;
use glimmer_core::clock::ManualClock;
use glimmer_core::config::GlimmerConfig;
use glimmer_core::creature::CreatureState;
use glimmer_core::emotion::EmotionEngine;
use glimmer_core::memory::MemorySystem;
use glimmer_core::particles::ParticleSystem;
use glimmer_core::persistence::MemoryStore;
use glimmer_core::types::{Bounds, BubbleKind, Vec2};
use glimmer_host::events::CursorTracker;
use glimmer_host::systems::World;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Fixed wall-clock origin for every fixture.
pub const NOON: i64 = 1_700_049_600_000;

/// An 800x600 world in memory with a full trail, `food` pellets scattered
/// away from the creature, a cloud of bubbles and a cursor in view.
#[must_use]
pub fn busy_world(food: usize) -> World {
    let config = GlimmerConfig::default();
    let bounds = Bounds { width: 800.0, height: 600.0 };
    let mut rng = StdRng::seed_from_u64(9);

    let mut creature = CreatureState::new(bounds.center(), NOON, config.creature.trail_capacity);
    for _ in 0..config.creature.trail_capacity {
        creature.push_trail();
    }

    let mut particles = ParticleSystem::new(config.particles.clone());
    for i in 0..food {
        #[allow(clippy::cast_precision_loss)]
        let x = 60.0 + (i % 10) as f32 * 60.0;
        particles.add_food(Vec2::new(x, 80.0), NOON, &mut rng);
    }
    particles.burst(bounds.center(), BubbleKind::Plain, 30, &mut rng);
    particles.add_ripple(Vec2::new(200.0, 200.0));

    let mut cursor = CursorTracker::default();
    cursor.move_to(Vec2::new(520.0, 300.0));

    World {
        memory: MemorySystem::load(
            Box::new(MemoryStore::new()),
            Rc::new(ManualClock::new(NOON)),
            config.memory.clone(),
        ),
        emotion: EmotionEngine::new(config.emotion.clone()),
        recall: MemoryRecall::default(),
        started_ms: NOON,
        creature,
        particles,
        cursor,
        rng,
        bounds,
        config,
    }
}
