//! Integration Tests: End-to-End Creature Flows
//!
//! These tests drive the core pieces together the way the frame loop does:
//! memory load and decay across sessions, feed → consume → excited chains,
//! and the mood rules against live context.

use std::rc::Rc;

use glimmer_core::clock::{MS_PER_DAY, ManualClock};
use glimmer_core::config::{EmotionConfig, GlimmerConfig, MemoryConfig, ParticleConfig, PersistenceConfig};
use glimmer_core::creature::CreatureState;
use glimmer_core::emotion::{EmotionContext, EmotionEngine};
use glimmer_core::memory::{InteractionKind, MemoryRecord, MemorySystem};
use glimmer_core::particles::ParticleSystem;
use glimmer_core::persistence::{JsonFileStore, KeyValueStore, MemoryStore, SqliteStore};
use glimmer_core::physics;
use glimmer_core::types::{Bounds, Mood, Point, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;

const NOON: i64 = 1_700_049_600_000; // 2023-11-15T12:00:00Z

fn memory(store: &MemoryStore, clock: &ManualClock) -> MemorySystem {
    MemorySystem::load(
        Box::new(store.clone()),
        Rc::new(clock.clone()),
        MemoryConfig::default(),
    )
}

fn seed_trust(store: &MemoryStore, trust: f32, last_interaction: i64) {
    let record = MemoryRecord {
        trust_level: trust,
        last_interaction,
        ..MemoryRecord::fresh(20.0, last_interaction)
    };
    let mut handle = store.clone();
    handle
        .set(
            &MemoryConfig::default().storage_key,
            &serde_json::to_string(&record).expect("encode"),
        )
        .expect("seed");
}

// ---------------------------------------------------------------------------
// Fresh start
// ---------------------------------------------------------------------------

#[test]
fn fresh_creature_starts_curious_with_trust_twenty() {
    let clock = ManualClock::new(NOON);
    let memory = memory(&MemoryStore::new(), &clock);
    let emotion = EmotionEngine::new(EmotionConfig::default());

    assert!((memory.trust_level() - 20.0).abs() < f32::EPSILON);
    assert_eq!(emotion.mood(), Mood::Curious);
    assert!(memory.feeding_spots().is_empty());
    assert_eq!(memory.record().interaction_count, 0);
}

// ---------------------------------------------------------------------------
// Decay across sessions
// ---------------------------------------------------------------------------

#[test]
fn seventy_days_away_from_fifty_is_zero() {
    let store = MemoryStore::new();
    seed_trust(&store, 50.0, NOON - 70 * MS_PER_DAY);
    let clock = ManualClock::new(NOON);
    assert!(memory(&store, &clock).trust_level().abs() < f32::EPSILON);
}

#[test]
fn decay_counts_whole_days_only() {
    let store = MemoryStore::new();
    seed_trust(&store, 50.0, NOON - 3 * MS_PER_DAY - MS_PER_DAY / 2);
    let clock = ManualClock::new(NOON);
    assert!((memory(&store, &clock).trust_level() - 47.0).abs() < 1e-4);
}

#[test]
fn reopening_same_day_does_not_decay_again() {
    let store = MemoryStore::new();
    seed_trust(&store, 40.0, NOON - 5 * MS_PER_DAY);
    let clock = ManualClock::new(NOON);
    {
        let mut first = memory(&store, &clock);
        assert!((first.trust_level() - 35.0).abs() < 1e-4);
        first.flush();
    }
    clock.advance(60_000);
    assert!((memory(&store, &clock).trust_level() - 35.0).abs() < 1e-4);
}

#[test]
fn sqlite_and_json_backends_share_the_wire_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = ManualClock::new(NOON);
    let config = PersistenceConfig::default();

    let sqlite = SqliteStore::open(dir.path().join("glimmer.db"), &config).expect("open sqlite");
    let mut mem = MemorySystem::load(Box::new(sqlite), Rc::new(clock.clone()), MemoryConfig::default());
    mem.record_feeding(Vec2::new(120.0, 80.0));
    mem.flush();
    drop(mem);

    let sqlite = SqliteStore::open(dir.path().join("glimmer.db"), &config).expect("reopen sqlite");
    let raw = sqlite
        .get(&MemoryConfig::default().storage_key)
        .expect("read")
        .expect("record present");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["trustLevel"], 23.0);
    assert_eq!(json["feedingSpots"][0]["x"], 120.0);

    let mut file = JsonFileStore::new(dir.path().join("glimmer.json"));
    file.set(&MemoryConfig::default().storage_key, &raw).expect("write json");
    let mem = MemorySystem::load(Box::new(file), Rc::new(clock), MemoryConfig::default());
    assert!((mem.trust_level() - 23.0).abs() < 1e-4);
    assert_eq!(mem.feeding_spots(), &[Point { x: 120.0, y: 80.0 }]);
}

// ---------------------------------------------------------------------------
// Feed → consume → excited
// ---------------------------------------------------------------------------

#[test]
fn food_near_the_mouth_is_eaten_once_and_excites() {
    let config = GlimmerConfig::default();
    let clock = ManualClock::new(NOON);
    let mut mem = memory(&MemoryStore::new(), &clock);
    let mut emotion = EmotionEngine::new(config.emotion.clone());
    let mut particles = ParticleSystem::new(ParticleConfig::default());
    let bounds = Bounds::new(800.0, 600.0, config.creature.boundary_margin).expect("bounds");
    let mut rng = StdRng::seed_from_u64(3);

    let p = Vec2::new(300.0, 300.0);
    particles.add_food(p, NOON, &mut rng);
    assert_eq!(particles.food().len(), 1);
    assert_eq!(particles.food()[0].sparkles.len(), 8);

    let before = mem.trust_level();
    let creature = CreatureState::new(p + Vec2::new(5.0, 0.0), NOON, 20);
    let eaten = particles.update(1.0, creature.position, NOON + 16, &bounds);
    let at = eaten.expect("pellet within reach is eaten");
    assert!(particles.food().is_empty());

    mem.record_feeding(at);
    emotion.force(Mood::Excited, 1.0);
    assert_eq!(emotion.mood(), Mood::Excited);
    assert!((emotion.state().intensity - 1.0).abs() < f32::EPSILON);
    assert!(mem.trust_level() - before >= 2.0);

    assert!(particles.update(1.0, creature.position, NOON + 32, &bounds).is_none());
}

#[test]
fn several_pellets_in_reach_are_eaten_one_per_tick() {
    let config = ParticleConfig::default();
    let mut particles = ParticleSystem::new(config);
    let bounds = Bounds { width: 800.0, height: 600.0 };
    let mut rng = StdRng::seed_from_u64(11);
    let here = Vec2::new(400.0, 300.0);
    particles.add_food(here, NOON, &mut rng);
    particles.add_food(here + Vec2::new(2.0, 0.0), NOON, &mut rng);

    assert!(particles.update(0.0, here, NOON, &bounds).is_some());
    assert_eq!(particles.food().len(), 1);
    assert!(particles.update(0.0, here, NOON, &bounds).is_some());
    assert!(particles.food().is_empty());
}

#[test]
fn uneaten_food_expires_after_ten_seconds() {
    let mut particles = ParticleSystem::new(ParticleConfig::default());
    let bounds = Bounds { width: 800.0, height: 600.0 };
    let mut rng = StdRng::seed_from_u64(5);
    particles.add_food(Vec2::new(400.0, 100.0), NOON, &mut rng);
    let far = Vec2::new(50.0, 550.0);

    particles.update(0.0, far, NOON + 9_999, &bounds);
    assert_eq!(particles.food().len(), 1);
    particles.update(0.0, far, NOON + 10_000, &bounds);
    assert!(particles.food().is_empty());
}

// ---------------------------------------------------------------------------
// Mood rules with real memory
// ---------------------------------------------------------------------------

#[test]
fn low_trust_fast_cursor_is_shy_not_playful() {
    let mut emotion = EmotionEngine::new(EmotionConfig::default());
    let ctx = EmotionContext {
        trust_level: 20.0,
        time_since_last_interaction_ms: 0,
        cursor_present: true,
        cursor_speed: 60.0,
    };
    emotion.update(16.0, &ctx);
    assert_eq!(emotion.mood(), Mood::Shy);
}

#[test]
fn long_silence_makes_any_creature_lonely() {
    let store = MemoryStore::new();
    seed_trust(&store, 95.0, NOON);
    let clock = ManualClock::new(NOON);
    let mem = memory(&store, &clock);
    clock.advance(61_000);

    let mut emotion = EmotionEngine::new(EmotionConfig::default());
    let ctx = EmotionContext {
        trust_level: mem.trust_level(),
        time_since_last_interaction_ms: mem.time_since_last_interaction(),
        cursor_present: false,
        cursor_speed: 0.0,
    };
    emotion.update(16.0, &ctx);
    assert_eq!(emotion.mood(), Mood::Lonely);
}

#[test]
fn same_day_interactions_count_one_visit() {
    let clock = ManualClock::new(NOON);
    let mut mem = memory(&MemoryStore::new(), &clock);
    clock.advance(MS_PER_DAY);
    assert!(mem.record_interaction(InteractionKind::Tap));
    clock.advance(3_600_000);
    assert!(!mem.record_interaction(InteractionKind::Tap));
    assert_eq!(mem.record().visit_dates.len(), 2);
    assert!((mem.trust_level() - 25.0).abs() < 1e-4);
}

// ---------------------------------------------------------------------------
// Physics against the walls
// ---------------------------------------------------------------------------

#[test]
fn creature_pushed_past_the_margin_bounces_back() {
    let config = GlimmerConfig::default();
    let bounds = Bounds::new(800.0, 600.0, config.creature.boundary_margin).expect("bounds");
    let mut creature = CreatureState::new(Vec2::new(10.0, 300.0), NOON, 20);
    creature.velocity = Vec2::new(-3.0, 0.5);
    creature.target_velocity = Vec2::new(-3.0, 0.5);

    for _ in 0..10 {
        physics::integrate(&mut creature, Mood::Excited, 0.15, 1.0, &bounds, &config.creature);
        assert!(creature.position.x >= config.creature.boundary_margin);
        assert!(bounds.contains(creature.position, 0.0));
    }
}
