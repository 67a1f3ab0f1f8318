//! Motion integration, soft wall bounces and expressive smoothing.
//!
//! Time is measured in 60 Hz frames (`dt = 1.0` is one nominal frame), so
//! every rate below is "per frame" and scales with `dt` exponentially.

use crate::config::CreatureConfig;
use crate::creature::{CreatureState, Expression};
use crate::decay::MAX_TRUST;
use crate::types::{Bounds, Mood, Vec2};

/// Below this speed the heading is left alone.
const HEADING_MIN_SPEED_SQ: f32 = 1e-4;

/// Fraction of the remaining gap closed after `dt` frames at `rate` per frame.
#[must_use]
pub fn blend_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (1.0 - rate.clamp(0.0, 1.0)).powf(dt.max(0.0))
}

/// Move velocity toward the target, cap speed, integrate position, update
/// heading and bounce off the walls. Returns whether a wall was touched.
///
/// `responsiveness` is the per-frame approach rate from the emotional state.
pub fn integrate(
    creature: &mut CreatureState,
    mood: Mood,
    responsiveness: f32,
    dt: f32,
    bounds: &Bounds,
    config: &CreatureConfig,
) -> bool {
    let k = blend_factor(responsiveness, dt);
    creature.velocity += (creature.target_velocity - creature.velocity) * k;

    let cap = config.max_speed * mood.speed_cap_factor();
    creature.velocity = creature.velocity.clamp_length_max(cap);
    creature.position += creature.velocity * dt;

    if creature.velocity.length_squared() > HEADING_MIN_SPEED_SQ {
        creature.angle = creature.velocity.y.atan2(creature.velocity.x);
    }

    let touched = apply_boundary(
        &mut creature.position,
        &mut creature.velocity,
        bounds,
        config.boundary_margin,
        config.bounce_damping,
    );

    creature.dart_cooldown = (creature.dart_cooldown - dt).max(0.0);
    touched
}

/// Soft bounce: a position past the margin is clamped back onto it and the
/// offending velocity component is reversed and damped. Returns whether a
/// wall was touched.
pub fn apply_boundary(
    position: &mut Vec2,
    velocity: &mut Vec2,
    bounds: &Bounds,
    margin: f32,
    damping: f32,
) -> bool {
    let mut touched = false;

    if position.x < margin {
        position.x = margin;
        if velocity.x < 0.0 {
            velocity.x = -velocity.x * damping;
        }
        touched = true;
    } else if position.x > bounds.width - margin {
        position.x = bounds.width - margin;
        if velocity.x > 0.0 {
            velocity.x = -velocity.x * damping;
        }
        touched = true;
    }

    if position.y < margin {
        position.y = margin;
        if velocity.y < 0.0 {
            velocity.y = -velocity.y * damping;
        }
        touched = true;
    } else if position.y > bounds.height - margin {
        position.y = bounds.height - margin;
        if velocity.y > 0.0 {
            velocity.y = -velocity.y * damping;
        }
        touched = true;
    }

    touched
}

/// Full-intensity expression and glow for a mood.
#[must_use]
pub fn expression_target(mood: Mood) -> (Expression, f32) {
    let (eye_dilation, fin_spread, body_tension, glow) = match mood {
        Mood::Curious => (0.6, 0.5, 0.3, 0.5),
        Mood::Playful => (0.7, 0.8, 0.4, 0.7),
        Mood::Shy => (0.3, 0.2, 0.8, 0.3),
        Mood::Excited => (0.9, 0.9, 0.7, 1.0),
        Mood::Trusting => (0.5, 0.7, 0.1, 0.8),
        Mood::Lonely => (0.4, 0.3, 0.2, 0.2),
    };
    (
        Expression {
            eye_dilation,
            fin_spread,
            body_tension,
        },
        glow,
    )
}

/// Ease eyes, fins, tension and glow toward the mood's targets. Weak moods
/// stay closer to the neutral expression; trust adds a little extra glow.
pub fn smooth_expression(
    creature: &mut CreatureState,
    mood: Mood,
    intensity: f32,
    trust: f32,
    dt: f32,
    config: &CreatureConfig,
) {
    let (target, glow) = expression_target(mood);
    let neutral = Expression::default();
    let i = intensity.clamp(0.0, 1.0);
    let aim = |n: f32, t: f32| n + (t - n) * i;

    let k = blend_factor(config.expression_smoothing, dt);
    let e = &mut creature.expression;
    e.eye_dilation += (aim(neutral.eye_dilation, target.eye_dilation) - e.eye_dilation) * k;
    e.fin_spread += (aim(neutral.fin_spread, target.fin_spread) - e.fin_spread) * k;
    e.body_tension += (aim(neutral.body_tension, target.body_tension) - e.body_tension) * k;

    let glow_target = (glow + 0.2 * trust / MAX_TRUST).clamp(0.0, 1.0);
    let kg = blend_factor(config.glow_smoothing, dt);
    creature.glow += (glow_target - creature.glow) * kg;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds { width: 800.0, height: 600.0 }
    }

    #[test]
    fn left_wall_clamps_and_reflects() {
        let config = CreatureConfig::default();
        let mut c = CreatureState::new(Vec2::new(20.0, 300.0), 0, 4);
        c.velocity = Vec2::new(-2.0, 0.0);
        c.target_velocity = Vec2::new(-2.0, 0.0);
        integrate(&mut c, Mood::Curious, Mood::Curious.responsiveness(), 1.0, &bounds(), &config);
        assert!((c.position.x - config.boundary_margin).abs() < f32::EPSILON);
        assert!(c.velocity.x >= 0.0);
    }

    #[test]
    fn bounce_damps_velocity() {
        let mut pos = Vec2::new(790.0, 300.0);
        let mut vel = Vec2::new(2.0, 1.0);
        assert!(apply_boundary(&mut pos, &mut vel, &bounds(), 50.0, 0.9));
        assert!((pos.x - 750.0).abs() < f32::EPSILON);
        assert!((vel.x + 1.8).abs() < 1e-6);
        assert!((vel.y - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn inside_margin_is_untouched() {
        let mut pos = Vec2::new(400.0, 300.0);
        let mut vel = Vec2::new(2.0, -1.0);
        assert!(!apply_boundary(&mut pos, &mut vel, &bounds(), 50.0, 0.9));
        assert_eq!(vel, Vec2::new(2.0, -1.0));
    }

    #[test]
    fn speed_cap_scales_with_mood() {
        let config = CreatureConfig::default();
        for (mood, factor) in [(Mood::Excited, 1.5), (Mood::Shy, 0.6), (Mood::Curious, 1.0)] {
            let mut c = CreatureState::new(Vec2::new(400.0, 300.0), 0, 4);
            c.target_velocity = Vec2::new(100.0, 0.0);
            for _ in 0..200 {
                c.position = Vec2::new(400.0, 300.0);
                integrate(&mut c, mood, 1.0, 1.0, &bounds(), &config);
            }
            assert!((c.velocity.length() - config.max_speed * factor).abs() < 1e-3, "{mood}");
        }
    }

    #[test]
    fn excited_converges_faster_than_shy() {
        let config = CreatureConfig::default();
        let run = |mood: Mood| {
            let mut c = CreatureState::new(Vec2::new(400.0, 300.0), 0, 4);
            c.target_velocity = Vec2::new(0.5, 0.0);
            integrate(&mut c, mood, mood.responsiveness(), 1.0, &bounds(), &config);
            c.velocity.x
        };
        assert!(run(Mood::Excited) > run(Mood::Shy));
    }

    #[test]
    fn heading_follows_velocity() {
        let config = CreatureConfig::default();
        let mut c = CreatureState::new(Vec2::new(400.0, 300.0), 0, 4);
        c.velocity = Vec2::new(0.0, 1.0);
        c.target_velocity = Vec2::new(0.0, 1.0);
        integrate(&mut c, Mood::Curious, 0.05, 1.0, &bounds(), &config);
        assert!((c.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn expression_moves_toward_mood_target() {
        let config = CreatureConfig::default();
        let mut c = CreatureState::new(Vec2::ZERO, 0, 4);
        for _ in 0..300 {
            smooth_expression(&mut c, Mood::Shy, 1.0, 0.0, 1.0, &config);
        }
        assert!((c.expression.body_tension - 0.8).abs() < 1e-2);
        assert!((c.expression.fin_spread - 0.2).abs() < 1e-2);
        assert!((c.glow - 0.3).abs() < 1e-2);
    }

    #[test]
    fn cooldown_counts_down_to_zero() {
        let config = CreatureConfig::default();
        let mut c = CreatureState::new(Vec2::new(400.0, 300.0), 0, 4);
        c.dart_cooldown = 1.5;
        integrate(&mut c, Mood::Excited, 0.15, 1.0, &bounds(), &config);
        assert!((c.dart_cooldown - 0.5).abs() < 1e-6);
        integrate(&mut c, Mood::Excited, 0.15, 1.0, &bounds(), &config);
        assert!(c.dart_cooldown.abs() < f32::EPSILON);
    }
}
