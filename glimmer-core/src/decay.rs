//! Trust decay across absences.
//!
//! Trust fades linearly with the number of whole days since the last
//! interaction: one point per day away, floored at zero.
//!
//!   T' = max(0, T - floor((now - last) / 1 day))
//!
//! Decay is applied once, when the record is loaded; it never runs while a
//! session is live.

use crate::clock::whole_days_between;

/// Upper bound of the trust scale.
pub const MAX_TRUST: f32 = 100.0;

/// Clamp a trust value into `[0, 100]`, mapping NaN to zero.
#[must_use]
pub fn clamp_trust(trust: f32) -> f32 {
    if trust.is_nan() {
        return 0.0;
    }
    trust.clamp(0.0, MAX_TRUST)
}

/// Trust after an absence from `last_interaction_ms` until `now_ms`.
#[must_use]
pub fn decayed_trust(stored: f32, last_interaction_ms: i64, now_ms: i64) -> f32 {
    let days = whole_days_between(last_interaction_ms, now_ms);
    #[allow(clippy::cast_precision_loss)]
    let lost = days as f32;
    clamp_trust(stored - lost)
}
