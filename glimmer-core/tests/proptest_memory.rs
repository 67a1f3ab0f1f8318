//! Property-Based Tests for Glimmer Core
//!
//! Uses `proptest` to check the trust and memory invariants under random
//! event sequences: trust stays in range, feeding spots stay bounded, and
//! decay follows `max(0, T - N)`.

use std::rc::Rc;

use proptest::prelude::*;

use glimmer_core::clock::{MS_PER_DAY, ManualClock};
use glimmer_core::config::{CreatureConfig, EmotionConfig, MemoryConfig};
use glimmer_core::decay;
use glimmer_core::emotion::{EmotionContext, EmotionEngine};
use glimmer_core::memory::{InteractionKind, MemoryRecord, MemorySystem};
use glimmer_core::persistence::{KeyValueStore, MemoryStore};
use glimmer_core::physics;
use glimmer_core::creature::CreatureState;
use glimmer_core::types::{Bounds, Mood, Vec2};

const NOON: i64 = 1_700_049_600_000;

fn system(store: &MemoryStore, clock: &ManualClock) -> MemorySystem {
    MemorySystem::load(
        Box::new(store.clone()),
        Rc::new(clock.clone()),
        MemoryConfig::default(),
    )
}

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Event {
    Trust(f32),
    Feed(f32, f32),
    Tap,
    Wait(i64),
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (-500.0..500.0f32).prop_map(Event::Trust),
        (0.0..800.0f32, 0.0..600.0f32).prop_map(|(x, y)| Event::Feed(x, y)),
        Just(Event::Tap),
        (0..3 * MS_PER_DAY).prop_map(Event::Wait),
    ]
}

fn arb_mood() -> impl Strategy<Value = Mood> {
    prop::sample::select(Mood::ALL.to_vec())
}

// ---------------------------------------------------------------------------
// Property: trust is always within [0, 100]
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn trust_stays_in_range(deltas in prop::collection::vec(-1_000.0..1_000.0f32, 0..64)) {
        let clock = ManualClock::new(NOON);
        let mut mem = system(&MemoryStore::new(), &clock);
        for d in deltas {
            let t = mem.add_trust(d);
            prop_assert!((0.0..=100.0).contains(&t));
        }
    }
}

proptest! {
    #[test]
    fn mixed_events_keep_invariants(events in prop::collection::vec(arb_event(), 0..80)) {
        let clock = ManualClock::new(NOON);
        let store = MemoryStore::new();
        let mut mem = system(&store, &clock);
        for event in events {
            match event {
                Event::Trust(d) => { mem.add_trust(d); }
                Event::Feed(x, y) => mem.record_feeding(Vec2::new(x, y)),
                Event::Tap => { mem.record_interaction(InteractionKind::Tap); }
                Event::Wait(ms) => clock.advance(ms),
            }
            let t = mem.trust_level();
            prop_assert!((0.0..=100.0).contains(&t));
            prop_assert!(mem.feeding_spots().len() <= 10);
        }

        // Whatever was written reloads within range.
        let reloaded = system(&store, &clock);
        prop_assert!((0.0..=100.0).contains(&reloaded.trust_level()));
    }
}

// ---------------------------------------------------------------------------
// Property: feeding spots are a bounded FIFO
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn feeding_spots_evict_oldest(n in 0usize..40) {
        let clock = ManualClock::new(NOON);
        let mut mem = system(&MemoryStore::new(), &clock);
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32;
            mem.record_feeding(Vec2::new(x, 0.0));
        }
        let spots = mem.feeding_spots();
        prop_assert_eq!(spots.len(), n.min(10));
        if let Some(last) = spots.last() {
            #[allow(clippy::cast_precision_loss)]
            let expected = (n - 1) as f32;
            prop_assert!((last.x - expected).abs() < f32::EPSILON);
        }
        if n > 10 {
            #[allow(clippy::cast_precision_loss)]
            let oldest = (n - 10) as f32;
            prop_assert!((spots[0].x - oldest).abs() < f32::EPSILON);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: load applies max(0, T - N)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn load_decays_by_whole_days(trust in 0.0..=100.0f32, days in 0i64..200) {
        let store = MemoryStore::new();
        let last = NOON - days * MS_PER_DAY;
        let record = MemoryRecord { trust_level: trust, last_interaction: last, ..MemoryRecord::fresh(20.0, last) };
        let mut handle = store.clone();
        handle.set(&MemoryConfig::default().storage_key, &serde_json::to_string(&record).expect("encode")).expect("seed");

        let clock = ManualClock::new(NOON);
        let mem = system(&store, &clock);
        #[allow(clippy::cast_precision_loss)]
        let expected = (trust - days as f32).max(0.0);
        prop_assert!((mem.trust_level() - expected).abs() < 1e-3);
        prop_assert!((decay::decayed_trust(trust, last, NOON) - expected).abs() < 1e-3);
    }
}

// ---------------------------------------------------------------------------
// Property: at most one mood transition per tick
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn one_transition_per_tick(
        ticks in prop::collection::vec(
            (0.0..100.0f32, 0i64..120_000, any::<bool>(), 0.0..100.0f32, any::<bool>()),
            1..50,
        )
    ) {
        let mut emotion = EmotionEngine::new(EmotionConfig::default());
        for (trust, idle, present, speed, feed) in ticks {
            let before = emotion.history().count();
            let ctx = EmotionContext {
                trust_level: trust,
                time_since_last_interaction_ms: idle,
                cursor_present: present,
                cursor_speed: speed,
            };
            emotion.update(16.0, &ctx);
            if feed {
                emotion.force(Mood::Excited, 1.0);
            }
            let after = emotion.history().count();
            prop_assert!(after <= before + 1);
            prop_assert!(after <= 10);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: physics never leaves the swimming area
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn integration_stays_inside_margins(
        mood in arb_mood(),
        start in (0.0..800.0f32, 0.0..600.0f32),
        target in (-20.0..20.0f32, -20.0..20.0f32),
        steps in 1usize..120,
    ) {
        let config = CreatureConfig::default();
        let bounds = Bounds::new(800.0, 600.0, config.boundary_margin).expect("bounds");
        let mut c = CreatureState::new(Vec2::new(start.0, start.1), NOON, 20);
        c.target_velocity = Vec2::new(target.0, target.1);
        for _ in 0..steps {
            physics::integrate(&mut c, mood, mood.responsiveness(), 1.0, &bounds, &config);
            let m = config.boundary_margin;
            prop_assert!(c.position.x >= m && c.position.x <= bounds.width - m);
            prop_assert!(c.position.y >= m && c.position.y <= bounds.height - m);
            prop_assert!(c.velocity.length() <= config.max_speed * mood.speed_cap_factor() + 1e-3);
        }
    }
}
