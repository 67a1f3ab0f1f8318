//! Emotional state machine.
//!
//! Each tick the machine evaluates a fixed, prioritized rule list against
//! the live context; the first rule whose condition holds decides the mood
//! for the tick. If that mood is already current nothing happens.
//!
//! | # | Condition                                          | Mood     | Intensity |
//! |---|----------------------------------------------------|----------|-----------|
//! | 1 | idle > 60 s                                        | lonely   | 0.8       |
//! | 2 | trust > 80 and cursor present                      | trusting | 0.9       |
//! | 3 | trust < 30 or cursor speed > 50                    | shy      | 0.6       |
//! | 4 | trust > 50, cursor present, speed in (10, 30)      | playful  | 0.7       |
//! | 5 | cursor newly present while lonely                  | curious  | 0.5       |
//! | 6 | excited for longer than the hold time              | curious  | 0.5       |
//!
//! Feeding forces `excited` directly via [`EmotionEngine::force`] and
//! suspends rule evaluation until the excited hold time has passed.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::config::EmotionConfig;
use crate::types::Mood;

/// Live signals the mood rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionContext {
    /// Current trust in `[0, 100]`.
    pub trust_level: f32,
    /// Milliseconds since the last trust-affecting interaction.
    pub time_since_last_interaction_ms: i64,
    /// Whether a pointer is over the surface.
    pub cursor_present: bool,
    /// Pointer speed in units per frame.
    pub cursor_speed: f32,
}

/// Current emotional state. Not persisted; every session starts curious.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionalState {
    /// Active mood.
    pub mood: Mood,
    /// Strength of the mood in `[0, 1]`.
    pub intensity: f32,
    /// Milliseconds spent in this mood.
    pub duration_ms: f32,
    /// Responsiveness handed to the physics step.
    pub transition_speed: f32,
}

impl EmotionalState {
    fn enter(mood: Mood, intensity: f32) -> Self {
        Self {
            mood,
            intensity: intensity.clamp(0.0, 1.0),
            duration_ms: 0.0,
            transition_speed: mood.responsiveness(),
        }
    }
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self::enter(Mood::Curious, 0.5)
    }
}

/// Why a transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    /// Nobody interacted for too long.
    Idle,
    /// High trust and a present cursor.
    Trust,
    /// Low trust or a startling cursor.
    Fear,
    /// Gentle cursor play.
    Play,
    /// Someone came back while the creature was lonely.
    Greeting,
    /// An excited burst wore off.
    Settle,
    /// An explicit event (feeding, eating) overrode the rules.
    Override,
}

/// A completed mood change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodTransition {
    /// Mood left behind.
    pub from: Mood,
    /// Mood entered.
    pub to: Mood,
    /// Intensity of the new mood.
    pub intensity: f32,
    /// What triggered it.
    pub cause: TransitionCause,
}

/// The mood state machine.
#[derive(Debug, Clone)]
pub struct EmotionEngine {
    config: EmotionConfig,
    state: EmotionalState,
    history: VecDeque<EmotionalState>,
    cursor_was_present: bool,
    rules_suspended: bool,
    /// State at the start of the current tick, if a rule already changed it.
    tick_origin: Option<EmotionalState>,
}

impl EmotionEngine {
    /// A curious creature.
    #[must_use]
    pub fn new(config: EmotionConfig) -> Self {
        Self {
            history: VecDeque::with_capacity(config.history_len),
            config,
            state: EmotionalState::default(),
            cursor_was_present: false,
            rules_suspended: false,
            tick_origin: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &EmotionalState {
        &self.state
    }

    /// Current mood.
    #[must_use]
    pub fn mood(&self) -> Mood {
        self.state.mood
    }

    /// Prior states, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &EmotionalState> {
        self.history.iter()
    }

    /// Advance by `delta_ms` and evaluate the rules. At most one transition
    /// happens per call.
    pub fn update(&mut self, delta_ms: f32, ctx: &EmotionContext) -> Option<MoodTransition> {
        self.tick_origin = None;
        self.state.duration_ms += delta_ms.max(0.0);

        let newly_present = ctx.cursor_present && !self.cursor_was_present;
        self.cursor_was_present = ctx.cursor_present;

        if self.rules_suspended {
            if self.state.mood == Mood::Excited && self.state.duration_ms < self.config.excited_hold_ms {
                return None;
            }
            self.rules_suspended = false;
        }

        let (mood, intensity, cause) = self.select(ctx, newly_present)?;
        if mood == self.state.mood {
            return None;
        }

        let from = self.state;
        self.push_history(from);
        self.tick_origin = Some(from);
        self.state = EmotionalState::enter(mood, intensity);

        debug!(from = %from.mood, to = %mood, ?cause, "Mood transition");
        Some(MoodTransition {
            from: from.mood,
            to: mood,
            intensity: self.state.intensity,
            cause,
        })
    }

    /// First rule whose condition holds.
    fn select(&self, ctx: &EmotionContext, newly_present: bool) -> Option<(Mood, f32, TransitionCause)> {
        let c = &self.config;
        let trust = ctx.trust_level;
        let speed = ctx.cursor_speed;

        if ctx.time_since_last_interaction_ms > c.lonely_after_ms {
            return Some((Mood::Lonely, 0.8, TransitionCause::Idle));
        }
        if trust > c.trusting_trust && ctx.cursor_present {
            return Some((Mood::Trusting, 0.9, TransitionCause::Trust));
        }
        if trust < c.shy_trust || speed > c.startle_speed {
            return Some((Mood::Shy, 0.6, TransitionCause::Fear));
        }
        if trust > c.playful_trust
            && ctx.cursor_present
            && speed > c.playful_speed_min
            && speed < c.playful_speed_max
        {
            return Some((Mood::Playful, 0.7, TransitionCause::Play));
        }
        if newly_present && self.state.mood == Mood::Lonely {
            return Some((Mood::Curious, 0.5, TransitionCause::Greeting));
        }
        if self.state.mood == Mood::Excited && self.state.duration_ms >= c.excited_hold_ms {
            return Some((Mood::Curious, 0.5, TransitionCause::Settle));
        }
        None
    }

    /// Close the current tick. A later [`force`](Self::force) starts from
    /// the settled state instead of replacing this tick's transition.
    pub fn finish_tick(&mut self) {
        self.tick_origin = None;
    }

    /// Override the rules and jump straight to `mood`.
    ///
    /// If a rule already changed the mood during the current tick, that
    /// change is replaced rather than stacked, so a tick still records a
    /// single transition. Outside a tick (after [`finish_tick`](Self::finish_tick))
    /// it always starts from the current state. Forcing the current mood
    /// only refreshes it.
    pub fn force(&mut self, mood: Mood, intensity: f32) -> Option<MoodTransition> {
        self.rules_suspended = true;

        let origin = match self.tick_origin.take() {
            Some(origin) => {
                self.history.pop_back();
                origin
            }
            None => self.state,
        };

        if origin.mood == mood {
            self.state = EmotionalState {
                intensity: intensity.clamp(0.0, 1.0),
                duration_ms: 0.0,
                ..origin
            };
            return None;
        }

        self.push_history(origin);
        self.tick_origin = Some(origin);
        self.state = EmotionalState::enter(mood, intensity);

        debug!(from = %origin.mood, to = %mood, "Mood override");
        Some(MoodTransition {
            from: origin.mood,
            to: mood,
            intensity: self.state.intensity,
            cause: TransitionCause::Override,
        })
    }

    fn push_history(&mut self, state: EmotionalState) {
        if self.config.history_len == 0 {
            return;
        }
        while self.history.len() >= self.config.history_len {
            self.history.pop_front();
        }
        self.history.push_back(state);
    }
}
