//! Core type definitions shared across the simulation.
//!
//! Vectors are `glam::Vec2` in surface units (pixels) with `+y` pointing
//! down, matching the coordinate system of the drawing surface.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use glam::Vec2;

use crate::error::{GlimmerError, Result};

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// Discrete emotional category driving behavior and visual style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Default state: mild interest in the surroundings.
    Curious,
    /// Energetic, orbits the cursor.
    Playful,
    /// Afraid of the cursor, hides near the edges.
    Shy,
    /// Just fed (or about to be): darts around.
    Excited,
    /// Follows the cursor closely.
    Trusting,
    /// Nobody has been around for a while.
    Lonely,
}

impl Mood {
    /// Number of moods; sizes the behavior dispatch table.
    pub const COUNT: usize = 6;

    /// Every mood, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Curious,
        Self::Playful,
        Self::Shy,
        Self::Excited,
        Self::Trusting,
        Self::Lonely,
    ];

    /// Lowercase name, as used for styling by the renderer.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Curious => "curious",
            Self::Playful => "playful",
            Self::Shy => "shy",
            Self::Excited => "excited",
            Self::Trusting => "trusting",
            Self::Lonely => "lonely",
        }
    }

    /// Dense index into per-mood tables.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// How quickly velocity chases its target in this mood (per 60 Hz frame).
    ///
    /// Excited reacts fastest, shy slowest.
    #[must_use]
    pub fn responsiveness(self) -> f32 {
        match self {
            Self::Excited => 0.15,
            Self::Playful => 0.10,
            Self::Trusting => 0.08,
            Self::Curious => 0.05,
            Self::Lonely => 0.03,
            Self::Shy => 0.02,
        }
    }

    /// Multiplier applied to the base speed cap.
    #[must_use]
    pub fn speed_cap_factor(self) -> f32 {
        match self {
            Self::Excited => 1.5,
            Self::Shy => 0.6,
            _ => 1.0,
        }
    }

    /// Bubble style emitted while in this mood.
    #[must_use]
    pub fn bubble_kind(self) -> BubbleKind {
        match self {
            Self::Excited => BubbleKind::Sparkle,
            Self::Trusting => BubbleKind::Heart,
            Self::Playful => BubbleKind::Bounce,
            Self::Lonely => BubbleKind::Sigh,
            Self::Curious | Self::Shy => BubbleKind::Plain,
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Self::Curious
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Visual style of a bubble, derived from the mood that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleKind {
    /// Ordinary breathing bubble.
    Plain,
    /// Celebration after eating.
    Sparkle,
    /// Affection while trusting.
    Heart,
    /// Bouncy playful bubble.
    Bounce,
    /// Slow, sad bubble while lonely.
    Sigh,
}

/// What the creature is currently doing, for presentation and memory tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwimPattern {
    /// Gentle sinusoidal meander.
    Wander,
    /// Cautious approach toward the cursor.
    Approach,
    /// Orbiting the cursor in a figure eight.
    Orbit,
    /// Chasing the cursor.
    Pursue,
    /// Fleeing toward a corner.
    Retreat,
    /// Sliding along the nearest wall.
    EdgeHug,
    /// Darting at food.
    Dart,
    /// Random high-speed burst.
    Burst,
    /// Following the cursor at a trusted distance.
    Follow,
    /// Holding still next to the cursor.
    Hover,
    /// Slow lonely drift.
    Drift,
    /// At rest (paused or reduced motion).
    Rest,
}

impl SwimPattern {
    /// Snake-case tag stored as the memory `behaviorPattern`.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Wander => "wander",
            Self::Approach => "approach",
            Self::Orbit => "orbit",
            Self::Pursue => "pursue",
            Self::Retreat => "retreat",
            Self::EdgeHug => "edge_hug",
            Self::Dart => "dart",
            Self::Burst => "burst",
            Self::Follow => "follow",
            Self::Hover => "hover",
            Self::Drift => "drift",
            Self::Rest => "rest",
        }
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A plain `{x, y}` point, the persisted shape of a feeding spot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// The visible swimming area, `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Surface width.
    pub width: f32,
    /// Surface height.
    pub height: f32,
}

impl Bounds {
    /// Validate a surface size. Both extents must be finite and wider than
    /// twice the boundary margin, otherwise the creature has nowhere to swim.
    ///
    /// # Errors
    /// Returns [`GlimmerError::InvalidSurface`] for unusable sizes.
    pub fn new(width: f32, height: f32, margin: f32) -> Result<Self> {
        let min = margin * 2.0;
        if !width.is_finite() || !height.is_finite() || width <= min || height <= min {
            return Err(GlimmerError::InvalidSurface { width, height, min });
        }
        Ok(Self { width, height })
    }

    /// Center of the surface.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Whether `p` lies inside the surface grown by `slack` on every side.
    #[must_use]
    pub fn contains(&self, p: Vec2, slack: f32) -> bool {
        p.x >= -slack && p.x <= self.width + slack && p.y >= -slack && p.y <= self.height + slack
    }

    /// The four corners of the inset rectangle.
    #[must_use]
    pub fn corners(&self, inset: f32) -> [Vec2; 4] {
        let (l, r) = (inset, self.width - inset);
        let (t, b) = (inset, self.height - inset);
        [Vec2::new(l, t), Vec2::new(r, t), Vec2::new(l, b), Vec2::new(r, b)]
    }

    /// Projection of `p` onto the closest edge of the inset rectangle.
    #[must_use]
    pub fn nearest_edge_point(&self, p: Vec2, inset: f32) -> Vec2 {
        let left = p.x - inset;
        let right = self.width - inset - p.x;
        let top = p.y - inset;
        let bottom = self.height - inset - p.y;
        let min = left.min(right).min(top).min(bottom);
        if min == left {
            Vec2::new(inset, p.y)
        } else if min == right {
            Vec2::new(self.width - inset, p.y)
        } else if min == top {
            Vec2::new(p.x, inset)
        } else {
            Vec2::new(p.x, self.height - inset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_surfaces() {
        assert!(Bounds::new(0.0, 600.0, 50.0).is_err());
        assert!(Bounds::new(800.0, f32::NAN, 50.0).is_err());
        assert!(Bounds::new(100.0, 600.0, 50.0).is_err());
        assert!(Bounds::new(800.0, 600.0, 50.0).is_ok());
    }

    #[test]
    fn corners_are_inset() {
        let b = Bounds { width: 800.0, height: 600.0 };
        let corners = b.corners(50.0);
        assert!(corners.contains(&Vec2::new(50.0, 50.0)));
        assert!(corners.contains(&Vec2::new(750.0, 550.0)));
        assert!(corners.iter().all(|c| b.contains(*c, 0.0)));
    }

    #[test]
    fn nearest_edge_projects_on_closest_wall() {
        let b = Bounds { width: 800.0, height: 600.0 };
        assert_eq!(b.nearest_edge_point(Vec2::new(400.0, 580.0), 50.0), Vec2::new(400.0, 550.0));
        assert_eq!(b.nearest_edge_point(Vec2::new(60.0, 300.0), 50.0), Vec2::new(50.0, 300.0));
    }

    #[test]
    fn mood_serializes_lowercase() {
        let json = serde_json::to_string(&Mood::Trusting).expect("serialize");
        assert_eq!(json, "\"trusting\"");
    }

    #[test]
    fn responsiveness_ordering() {
        assert!(Mood::ALL.iter().all(|m| Mood::Excited.responsiveness() >= m.responsiveness()));
        assert!(Mood::ALL.iter().all(|m| Mood::Shy.responsiveness() <= m.responsiveness()));
    }
}
