//! The memory & trust system.
//!
//! Owns the [`MemoryRecord`] for the lifetime of an engine. Every mutation
//! writes the record back through the injected [`KeyValueStore`]; store
//! failures are logged and swallowed so the simulation never notices.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::clock::{Clock, MS_PER_DAY, utc_date, whole_days_between};
use crate::config::MemoryConfig;
use crate::decay::{clamp_trust, decayed_trust};
use crate::persistence::KeyValueStore;
use crate::types::{Point, Vec2};

use super::record::MemoryRecord;

/// What kind of interaction is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// A tap or click on the surface.
    Tap,
    /// Sustained pointer movement.
    Move,
    /// Food was eaten.
    Feed,
}

impl InteractionKind {
    fn name(self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Move => "move",
            Self::Feed => "feed",
        }
    }
}

/// Durable, decaying trust and interaction history.
pub struct MemorySystem {
    store: Box<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    config: MemoryConfig,
    record: MemoryRecord,
    last_movement_nudge_ms: Option<i64>,
}

impl std::fmt::Debug for MemorySystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySystem")
            .field("record", &self.record)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MemorySystem {
    /// Load the record from `store`, applying decay for the days spent away.
    ///
    /// A missing, unreadable or corrupt record falls back to a fresh one;
    /// this never fails.
    pub fn load(store: Box<dyn KeyValueStore>, clock: Rc<dyn Clock>, config: MemoryConfig) -> Self {
        let now = clock.now_ms();
        let record = match store.get(&config.storage_key) {
            Ok(Some(json)) => match MemoryRecord::parse(&json, config.max_feeding_spots) {
                Some(stored) => Self::apply_decay(stored, now),
                None => {
                    warn!(key = %config.storage_key, "Stored memory is corrupt, starting fresh");
                    MemoryRecord::fresh(config.initial_trust, now)
                }
            },
            Ok(None) => {
                info!("No stored memory, meeting for the first time");
                MemoryRecord::fresh(config.initial_trust, now)
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored memory, starting fresh");
                MemoryRecord::fresh(config.initial_trust, now)
            }
        };

        debug!(
            trust = record.trust_level,
            interactions = record.interaction_count,
            spots = record.feeding_spots.len(),
            "Memory loaded"
        );

        Self {
            store,
            clock,
            config,
            record,
            last_movement_nudge_ms: None,
        }
    }

    /// Decay trust for the whole days since the last interaction. The
    /// interaction anchor moves forward by the days consumed so that saving
    /// the decayed record does not decay it again on the next load.
    fn apply_decay(mut record: MemoryRecord, now: i64) -> MemoryRecord {
        let days = whole_days_between(record.last_interaction, now);
        if days > 0 {
            let before = record.trust_level;
            record.trust_level = decayed_trust(record.trust_level, record.last_interaction, now);
            record.last_interaction = record
                .last_interaction
                .saturating_add(days.saturating_mul(MS_PER_DAY));
            info!(days, before, after = record.trust_level, "Trust decayed while away");
        }
        record
    }

    /// The live record.
    #[must_use]
    pub fn record(&self) -> &MemoryRecord {
        &self.record
    }

    /// Current trust in `[0, 100]`.
    #[must_use]
    pub fn trust_level(&self) -> f32 {
        self.record.trust_level
    }

    /// Remembered feeding spots, oldest first.
    #[must_use]
    pub fn feeding_spots(&self) -> &[Point] {
        &self.record.feeding_spots
    }

    /// Milliseconds since the last trust-affecting interaction.
    #[must_use]
    pub fn time_since_last_interaction(&self) -> i64 {
        self.clock.now_ms().saturating_sub(self.record.last_interaction).max(0)
    }

    /// Shift trust by `delta`, clamped to `[0, 100]`. Returns the new trust.
    pub fn add_trust(&mut self, delta: f32) -> f32 {
        self.shift_trust(delta);
        self.persist();
        self.record.trust_level
    }

    fn shift_trust(&mut self, delta: f32) {
        self.record.trust_level = clamp_trust(self.record.trust_level + delta);
        self.record.last_interaction = self.clock.now_ms();
    }

    /// Remember that food was eaten at `position`.
    pub fn record_feeding(&mut self, position: Vec2) {
        self.record
            .push_feeding_spot(position.into(), self.config.max_feeding_spots);
        self.shift_trust(self.config.feeding_bonus);
        debug!(
            spot = %Point::from(position),
            trust = self.record.trust_level,
            "Feeding remembered"
        );
        self.persist();
    }

    /// Count an interaction. The first interaction of a new UTC calendar day
    /// is a visit and earns the daily bonus. Returns `true` for a new visit.
    pub fn record_interaction(&mut self, kind: InteractionKind) -> bool {
        let now = self.clock.now_ms();
        self.record.interaction_count += 1;

        let today = utc_date(now);
        let new_day = self
            .record
            .visit_dates
            .last()
            .is_none_or(|&last| utc_date(last) != today);

        if new_day {
            self.record.visit_dates.push(now);
            self.shift_trust(self.config.daily_visit_bonus);
            info!(
                kind = kind.name(),
                visits = self.record.visit_dates.len(),
                trust = self.record.trust_level,
                "New visit day"
            );
        } else {
            self.record.last_interaction = now;
        }

        self.persist();
        new_day
    }

    /// React to pointer movement at `cursor_speed` (units per frame).
    ///
    /// Gentle movement earns a little trust, fast movement costs some; both
    /// count as presence. Throttled to one nudge per configured interval.
    /// Returns the applied delta, or `None` while throttled.
    pub fn nudge_for_movement(&mut self, cursor_speed: f32, gentle: (f32, f32), fast: f32) -> Option<f32> {
        let now = self.clock.now_ms();
        if let Some(last) = self.last_movement_nudge_ms {
            if now.saturating_sub(last) < self.config.movement_nudge_interval_ms {
                return None;
            }
        }
        self.last_movement_nudge_ms = Some(now);

        let delta = if cursor_speed > fast {
            self.config.fast_movement_delta
        } else if cursor_speed > gentle.0 && cursor_speed < gentle.1 {
            self.config.gentle_movement_delta
        } else {
            0.0
        };
        self.add_trust(delta);
        Some(delta)
    }

    /// Tag the record with the creature's latest swim pattern.
    pub fn set_behavior_pattern(&mut self, tag: &str) {
        if self.record.behavior_pattern != tag {
            self.record.behavior_pattern = tag.to_string();
        }
    }

    /// Forget everything and start over as a fresh creature.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.remove(&self.config.storage_key) {
            warn!(error = %e, "Failed to delete stored memory");
        }
        self.record = MemoryRecord::fresh(self.config.initial_trust, self.clock.now_ms());
        self.last_movement_nudge_ms = None;
        info!("Memory reset");
        self.persist();
    }

    /// Write the record out now.
    pub fn flush(&mut self) {
        self.persist();
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.record) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to encode memory record");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.config.storage_key, &json) {
            warn!(error = %e, "Failed to save memory record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{GlimmerError, Result};
    use crate::persistence::MemoryStore;

    const NOON: i64 = 1_700_049_600_000; // 2023-11-15T12:00:00Z

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(GlimmerError::Store("disk on fire".into()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(GlimmerError::Store("disk on fire".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<()> {
            Err(GlimmerError::Store("disk on fire".into()))
        }
    }

    fn system_with(store: &MemoryStore, clock: &ManualClock) -> MemorySystem {
        MemorySystem::load(
            Box::new(store.clone()),
            Rc::new(clock.clone()),
            MemoryConfig::default(),
        )
    }

    fn seed(store: &MemoryStore, record: &MemoryRecord) {
        let mut handle = store.clone();
        handle
            .set(
                &MemoryConfig::default().storage_key,
                &serde_json::to_string(record).expect("encode"),
            )
            .expect("seed");
    }

    #[test]
    fn fresh_creature_defaults() {
        let clock = ManualClock::new(NOON);
        let memory = system_with(&MemoryStore::new(), &clock);
        assert!((memory.trust_level() - 20.0).abs() < f32::EPSILON);
        assert_eq!(memory.record().visit_dates, vec![NOON]);
        assert_eq!(memory.record().interaction_count, 0);
        assert!(memory.feeding_spots().is_empty());
    }

    #[test]
    fn load_applies_linear_decay() {
        let store = MemoryStore::new();
        let mut stored = MemoryRecord::fresh(50.0, NOON - 7 * MS_PER_DAY);
        stored.trust_level = 50.0;
        seed(&store, &stored);

        let clock = ManualClock::new(NOON);
        let memory = system_with(&store, &clock);
        assert!((memory.trust_level() - 43.0).abs() < f32::EPSILON);
    }

    #[test]
    fn seventy_days_away_forgets_all_trust() {
        let store = MemoryStore::new();
        seed(&store, &MemoryRecord::fresh(50.0, NOON - 70 * MS_PER_DAY));
        let memory = system_with(&store, &ManualClock::new(NOON));
        assert!(memory.trust_level().abs() < f32::EPSILON);
    }

    #[test]
    fn decay_is_not_applied_twice_after_flush() {
        let store = MemoryStore::new();
        seed(&store, &MemoryRecord::fresh(50.0, NOON - 5 * MS_PER_DAY));
        let clock = ManualClock::new(NOON);
        let mut memory = system_with(&store, &clock);
        memory.flush();
        drop(memory);

        let reloaded = system_with(&store, &clock);
        assert!((reloaded.trust_level() - 45.0).abs() < f32::EPSILON);
    }

    #[test]
    fn corrupt_record_is_treated_as_absent() {
        let mut store = MemoryStore::new();
        store
            .set(&MemoryConfig::default().storage_key, "{not json")
            .expect("seed");
        let memory = system_with(&store, &ManualClock::new(NOON));
        assert!((memory.trust_level() - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn extreme_interaction_times_never_panic() {
        let key = MemoryConfig::default().storage_key;

        let mut store = MemoryStore::new();
        let json = format!(r#"{{"trustLevel":50,"lastInteraction":{}}}"#, i64::MIN);
        store.set(&key, &json).expect("seed");
        let memory = system_with(&store, &ManualClock::new(NOON));
        assert!((memory.trust_level() - 20.0).abs() < f32::EPSILON);

        let mut store = MemoryStore::new();
        let json = format!(r#"{{"trustLevel":50,"lastInteraction":{}}}"#, i64::MAX);
        store.set(&key, &json).expect("seed");
        let memory = system_with(&store, &ManualClock::new(NOON));
        assert!((memory.trust_level() - 50.0).abs() < f32::EPSILON);
        assert_eq!(memory.time_since_last_interaction(), 0);
    }

    #[test]
    fn broken_store_never_raises() {
        let clock = ManualClock::new(NOON);
        let mut memory = MemorySystem::load(
            Box::new(BrokenStore),
            Rc::new(clock.clone()),
            MemoryConfig::default(),
        );
        memory.add_trust(10.0);
        memory.record_feeding(Vec2::new(1.0, 2.0));
        memory.record_interaction(InteractionKind::Tap);
        memory.reset();
        assert!((memory.trust_level() - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn add_trust_clamps_and_persists() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(NOON);
        let mut memory = system_with(&store, &clock);

        clock.advance(5_000);
        assert!((memory.add_trust(500.0) - 100.0).abs() < f32::EPSILON);
        assert_eq!(memory.record().last_interaction, NOON + 5_000);
        assert!(memory.add_trust(-500.0).abs() < f32::EPSILON);

        let saved = store
            .get(&MemoryConfig::default().storage_key)
            .expect("get")
            .expect("saved");
        let saved = MemoryRecord::parse(&saved, 10).expect("parse");
        assert!(saved.trust_level.abs() < f32::EPSILON);
    }

    #[test]
    fn feeding_adds_bonus_and_caps_spots() {
        let clock = ManualClock::new(NOON);
        let mut memory = system_with(&MemoryStore::new(), &clock);
        for i in 0..12 {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32;
            memory.record_feeding(Vec2::new(x, 0.0));
        }
        assert_eq!(memory.feeding_spots().len(), 10);
        assert!((memory.feeding_spots()[0].x - 2.0).abs() < f32::EPSILON);
        assert!((memory.trust_level() - 56.0).abs() < 1e-3);
    }

    #[test]
    fn daily_bonus_once_per_day() {
        let store = MemoryStore::new();
        seed(&store, &MemoryRecord::fresh(40.0, NOON - MS_PER_DAY / 2));
        let clock = ManualClock::new(NOON + MS_PER_DAY);
        let mut memory = system_with(&store, &clock);
        let visits_before = memory.record().visit_dates.len();
        let trust_before = memory.trust_level();

        assert!(memory.record_interaction(InteractionKind::Tap));
        clock.advance(60_000);
        assert!(!memory.record_interaction(InteractionKind::Tap));

        assert_eq!(memory.record().visit_dates.len(), visits_before + 1);
        assert_eq!(memory.record().interaction_count, 2);
        assert!((memory.trust_level() - (trust_before + 5.0)).abs() < 1e-3);
    }

    #[test]
    fn first_session_day_has_no_extra_bonus() {
        let clock = ManualClock::new(NOON);
        let mut memory = system_with(&MemoryStore::new(), &clock);
        assert!(!memory.record_interaction(InteractionKind::Tap));
        assert!((memory.trust_level() - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn movement_nudges_are_throttled() {
        let clock = ManualClock::new(NOON);
        let mut memory = system_with(&MemoryStore::new(), &clock);
        assert_eq!(memory.nudge_for_movement(20.0, (10.0, 30.0), 50.0), Some(0.1));
        clock.advance(200);
        assert_eq!(memory.nudge_for_movement(20.0, (10.0, 30.0), 50.0), None);
        clock.advance(1_000);
        assert_eq!(memory.nudge_for_movement(80.0, (10.0, 30.0), 50.0), Some(-0.5));
        assert!((memory.trust_level() - 19.6).abs() < 1e-4);
    }

    #[test]
    fn time_since_last_interaction_tracks_clock() {
        let clock = ManualClock::new(NOON);
        let mut memory = system_with(&MemoryStore::new(), &clock);
        clock.advance(61_000);
        assert_eq!(memory.time_since_last_interaction(), 61_000);
        memory.record_interaction(InteractionKind::Tap);
        assert_eq!(memory.time_since_last_interaction(), 0);
    }

    #[test]
    fn reset_restores_defaults() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(NOON);
        let mut memory = system_with(&store, &clock);
        memory.add_trust(40.0);
        memory.record_feeding(Vec2::ZERO);
        memory.reset();
        assert!((memory.trust_level() - 20.0).abs() < f32::EPSILON);
        assert!(memory.feeding_spots().is_empty());
        assert_eq!(store.len(), 1);
    }
}
