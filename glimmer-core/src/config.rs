//! Configuration for the glimmer simulation.
//!
//! Maps directly to `glimmer.toml`. Every field has a default, so an empty
//! file (or no file at all) yields the tuned behavior.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlimmerConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Creature motion and presentation tuning.
    #[serde(default)]
    pub creature: CreatureConfig,
    /// Mood transition thresholds.
    #[serde(default)]
    pub emotion: EmotionConfig,
    /// Trust and memory policy.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Food, bubble and ripple tuning.
    #[serde(default)]
    pub particles: ParticleConfig,
    /// Persistence backend.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Accessibility preferences.
    #[serde(default)]
    pub accessibility: AccessibilityConfig,
}

impl GlimmerConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `GlimmerError::Config` if the TOML is invalid or a value is
    /// out of range (see [`validate`](Self::validate)).
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| crate::GlimmerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every tunable is finite and inside the range the
    /// simulation can use.
    ///
    /// # Errors
    /// Returns `GlimmerError::Config` listing every offending field.
    pub fn validate(&self) -> crate::error::Result<()> {
        let mut problems = Vec::new();
        let c = &self.creature;
        let e = &self.emotion;
        let m = &self.memory;
        let p = &self.particles;

        non_negative(&mut problems, "creature.boundary_margin", c.boundary_margin);
        non_negative(&mut problems, "creature.idle_speed", c.idle_speed);
        non_negative(&mut problems, "creature.max_speed", c.max_speed);
        unit(&mut problems, "creature.bounce_damping", c.bounce_damping);
        unit(&mut problems, "creature.expression_smoothing", c.expression_smoothing);
        unit(&mut problems, "creature.glow_smoothing", c.glow_smoothing);

        for (name, value) in [
            ("emotion.trusting_trust", e.trusting_trust),
            ("emotion.shy_trust", e.shy_trust),
            ("emotion.playful_trust", e.playful_trust),
            ("emotion.startle_speed", e.startle_speed),
            ("emotion.playful_speed_min", e.playful_speed_min),
            ("emotion.playful_speed_max", e.playful_speed_max),
        ] {
            finite(&mut problems, name, value);
        }
        non_negative(&mut problems, "emotion.excited_hold_ms", e.excited_hold_ms);
        if e.lonely_after_ms < 0 {
            problems.push(format!("emotion.lonely_after_ms must be >= 0, got {}", e.lonely_after_ms));
        }

        if !(0.0..=100.0).contains(&m.initial_trust) {
            problems.push(format!("memory.initial_trust must be in [0, 100], got {}", m.initial_trust));
        }
        for (name, value) in [
            ("memory.feeding_bonus", m.feeding_bonus),
            ("memory.daily_visit_bonus", m.daily_visit_bonus),
            ("memory.gentle_movement_delta", m.gentle_movement_delta),
            ("memory.fast_movement_delta", m.fast_movement_delta),
        ] {
            finite(&mut problems, name, value);
        }
        unit(&mut problems, "memory.recall_strength", m.recall_strength);
        for (name, value) in [
            ("memory.movement_nudge_interval_ms", m.movement_nudge_interval_ms),
            ("memory.recall_after_ms", m.recall_after_ms),
            ("particles.food_ttl_ms", p.food_ttl_ms),
        ] {
            if value < 0 {
                problems.push(format!("{name} must be >= 0, got {value}"));
            }
        }

        non_negative(&mut problems, "particles.mouth_radius", p.mouth_radius);
        non_negative(&mut problems, "particles.sparkle_spread", p.sparkle_spread);
        finite(&mut problems, "particles.food_gravity", p.food_gravity);
        non_negative(&mut problems, "particles.bubble_fade", p.bubble_fade);
        non_negative(&mut problems, "particles.ripple_max_radius", p.ripple_max_radius);
        if !(0.0..=1.0).contains(&p.sigh_chance) {
            problems.push(format!("particles.sigh_chance must be in [0, 1], got {}", p.sigh_chance));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(crate::GlimmerError::Config(problems.join("; ")))
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fixed RNG seed for reproducible runs. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

/// Creature motion tuning. Speeds are surface units per 60 Hz frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureConfig {
    /// Distance from each edge where the soft bounce kicks in.
    #[serde(default = "default_50")]
    pub boundary_margin: f32,
    /// Cruising speed used by the wander patterns.
    #[serde(default = "default_1_0")]
    pub idle_speed: f32,
    /// Speed cap before the per-mood factor is applied.
    #[serde(default = "default_3_0")]
    pub max_speed: f32,
    /// Velocity retained on a wall bounce.
    #[serde(default = "default_0_9")]
    pub bounce_damping: f32,
    /// Number of past positions kept for the trail.
    #[serde(default = "default_20_usize")]
    pub trail_capacity: usize,
    /// How quickly eyes, fins and body tension follow their mood targets.
    #[serde(default = "default_0_1")]
    pub expression_smoothing: f32,
    /// How quickly glow follows its mood target.
    #[serde(default = "default_0_05")]
    pub glow_smoothing: f32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            boundary_margin: 50.0,
            idle_speed: 1.0,
            max_speed: 3.0,
            bounce_damping: 0.9,
            trail_capacity: 20,
            expression_smoothing: 0.1,
            glow_smoothing: 0.05,
        }
    }
}

/// Mood transition thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Idle time after which the creature gets lonely.
    #[serde(default = "default_60000")]
    pub lonely_after_ms: i64,
    /// Trust above which a present cursor makes the creature trusting.
    #[serde(default = "default_80")]
    pub trusting_trust: f32,
    /// Trust below which the creature is shy.
    #[serde(default = "default_30")]
    pub shy_trust: f32,
    /// Trust above which gentle cursor movement is playful.
    #[serde(default = "default_50")]
    pub playful_trust: f32,
    /// Cursor speed (units per frame) that scares the creature.
    #[serde(default = "default_50")]
    pub startle_speed: f32,
    /// Lower bound (exclusive) of playful cursor speed.
    #[serde(default = "default_10")]
    pub playful_speed_min: f32,
    /// Upper bound (exclusive) of playful cursor speed.
    #[serde(default = "default_30")]
    pub playful_speed_max: f32,
    /// How long an excited burst lasts before settling back to curious.
    #[serde(default = "default_5000")]
    pub excited_hold_ms: f32,
    /// Prior states kept for diagnostics.
    #[serde(default = "default_10_usize")]
    pub history_len: usize,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            lonely_after_ms: 60_000,
            trusting_trust: 80.0,
            shy_trust: 30.0,
            playful_trust: 50.0,
            startle_speed: 50.0,
            playful_speed_min: 10.0,
            playful_speed_max: 30.0,
            excited_hold_ms: 5_000.0,
            history_len: 10,
        }
    }
}

/// Trust and memory policy. The deltas are tunable, not invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Key the record is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Trust of a creature that has never met anyone.
    #[serde(default = "default_20")]
    pub initial_trust: f32,
    /// Trust gained per remembered feeding.
    #[serde(default = "default_3_0")]
    pub feeding_bonus: f32,
    /// Trust gained on the first interaction of a calendar day.
    #[serde(default = "default_5_0")]
    pub daily_visit_bonus: f32,
    /// Trust gained from gentle cursor movement.
    #[serde(default = "default_0_1")]
    pub gentle_movement_delta: f32,
    /// Trust lost from fast, jerky cursor movement.
    #[serde(default = "default_neg_0_5")]
    pub fast_movement_delta: f32,
    /// Minimum spacing between movement trust nudges.
    #[serde(default = "default_1000")]
    pub movement_nudge_interval_ms: i64,
    /// Remembered feeding spots (oldest evicted first).
    #[serde(default = "default_10_usize")]
    pub max_feeding_spots: usize,
    /// Time without food before the creature revisits a remembered spot.
    #[serde(default = "default_30000")]
    pub recall_after_ms: i64,
    /// How hard memory recall pulls on the target velocity.
    #[serde(default = "default_0_3")]
    pub recall_strength: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            initial_trust: 20.0,
            feeding_bonus: 3.0,
            daily_visit_bonus: 5.0,
            gentle_movement_delta: 0.1,
            fast_movement_delta: -0.5,
            movement_nudge_interval_ms: 1_000,
            max_feeding_spots: 10,
            recall_after_ms: 30_000,
            recall_strength: 0.3,
        }
    }
}

/// Food, bubble and ripple tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Lifetime of uneaten food.
    #[serde(default = "default_10000")]
    pub food_ttl_ms: i64,
    /// Distance at which the creature swallows food.
    #[serde(default = "default_15")]
    pub mouth_radius: f32,
    /// Sparkles orbiting each food pellet.
    #[serde(default = "default_8_usize")]
    pub sparkle_count: usize,
    /// Maximum sparkle offset on each axis.
    #[serde(default = "default_10")]
    pub sparkle_spread: f32,
    /// Downward acceleration on food per frame.
    #[serde(default = "default_0_02")]
    pub food_gravity: f32,
    /// Bubbles released when food is eaten.
    #[serde(default = "default_5_usize")]
    pub celebration_bubbles: usize,
    /// Opacity lost by a bubble per frame.
    #[serde(default = "default_0_01")]
    pub bubble_fade: f32,
    /// Radius at which a ripple is discarded.
    #[serde(default = "default_60")]
    pub ripple_max_radius: f32,
    /// Chance per frame that a lonely creature sighs a bubble.
    #[serde(default = "default_0_005")]
    pub sigh_chance: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            food_ttl_ms: 10_000,
            mouth_radius: 15.0,
            sparkle_count: 8,
            sparkle_spread: 10.0,
            food_gravity: 0.02,
            celebration_bubbles: 5,
            bubble_fade: 0.01,
            ripple_max_radius: 60.0,
            sigh_chance: 0.005,
        }
    }
}

/// Persistence backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Backend: "sqlite", "json" or "memory".
    #[serde(default = "default_sqlite")]
    pub backend: String,
    /// File backing the sqlite or json store.
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Use WAL mode for the sqlite backend.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Detect save corruption via checksums.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            path: default_store_path(),
            wal_mode: true,
            checksum_enabled: true,
        }
    }
}

/// Accessibility configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessibilityConfig {
    /// Reduce motion: the creature rests instead of swimming.
    #[serde(default)]
    pub reduce_motion: bool,
}

fn finite(problems: &mut Vec<String>, name: &str, value: f32) {
    if !value.is_finite() {
        problems.push(format!("{name} must be finite, got {value}"));
    }
}

fn non_negative(problems: &mut Vec<String>, name: &str, value: f32) {
    if !value.is_finite() || value < 0.0 {
        problems.push(format!("{name} must be finite and >= 0, got {value}"));
    }
}

fn unit(problems: &mut Vec<String>, name: &str, value: f32) {
    if !(0.0..=1.0).contains(&value) {
        problems.push(format!("{name} must be in [0, 1], got {value}"));
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_storage_key() -> String { "glimmer.memory".to_string() }
fn default_sqlite() -> String { "sqlite".to_string() }
fn default_store_path() -> String { "glimmer.db".to_string() }
fn default_0_005() -> f64 { 0.005 }
fn default_0_01() -> f32 { 0.01 }
fn default_0_02() -> f32 { 0.02 }
fn default_0_05() -> f32 { 0.05 }
fn default_0_1() -> f32 { 0.1 }
fn default_0_3() -> f32 { 0.3 }
fn default_neg_0_5() -> f32 { -0.5 }
fn default_0_9() -> f32 { 0.9 }
fn default_1_0() -> f32 { 1.0 }
fn default_3_0() -> f32 { 3.0 }
fn default_5_0() -> f32 { 5.0 }
fn default_10() -> f32 { 10.0 }
fn default_15() -> f32 { 15.0 }
fn default_20() -> f32 { 20.0 }
fn default_30() -> f32 { 30.0 }
fn default_50() -> f32 { 50.0 }
fn default_60() -> f32 { 60.0 }
fn default_80() -> f32 { 80.0 }
fn default_5000() -> f32 { 5_000.0 }
fn default_5_usize() -> usize { 5 }
fn default_8_usize() -> usize { 8 }
fn default_10_usize() -> usize { 10 }
fn default_20_usize() -> usize { 20 }
fn default_1000() -> i64 { 1_000 }
fn default_10000() -> i64 { 10_000 }
fn default_30000() -> i64 { 30_000 }
fn default_60000() -> i64 { 60_000 }
