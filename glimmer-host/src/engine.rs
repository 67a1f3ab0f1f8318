//! The simulation loop driver.
//!
//! The host owns the clock that fires frames; the engine only asks for the
//! next one. A typical embedding:
//!
//! ```text
//! engine.start();                 // subscribe inputs, request a frame
//! loop {
//!     host fires frame        -> engine.on_frame(Instant::now())
//!     host delivers input     -> engine.handle_input(event)
//! }
//! engine.destroy();               // cancel frame, flush memory, unsubscribe
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::time::Instant;

use glimmer_core::behavior::MemoryRecall;
use glimmer_core::clock::Clock;
use glimmer_core::config::GlimmerConfig;
use glimmer_core::creature::CreatureState;
use glimmer_core::emotion::{EmotionEngine, EmotionalState};
use glimmer_core::error::Result;
use glimmer_core::memory::{InteractionKind, MemorySystem};
use glimmer_core::particles::ParticleSystem;
use glimmer_core::persistence::KeyValueStore;
use glimmer_core::snapshot::{CreatureStats, FrameSnapshot};
use glimmer_core::types::{Bounds, Mood, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use crate::events::{CursorTracker, InputEvent, InputKind};
use crate::hooks::{FrameHandle, FrameScheduler, InputHost, ListenerId, RenderSink};
use crate::systems::{self, FRAME_MS, World};

/// Longest frame delta fed to the simulation. Anything longer (a stalled
/// tab, a debugger break) is treated as this.
pub const MAX_DELTA_MS: f32 = 100.0;

/// Lifecycle of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Built but never started.
    Idle,
    /// Ticking every frame.
    Running,
    /// Started, but the surface is hidden.
    Paused,
    /// Stopped by the host.
    Stopped,
    /// A tick went wrong; stopped until started again.
    Faulted,
    /// Torn down for good.
    Destroyed,
}

/// Services the host provides.
pub struct EngineServices {
    /// Durable key-value store for the memory record.
    pub store: Box<dyn KeyValueStore>,
    /// Wall clock.
    pub clock: Rc<dyn Clock>,
    /// Frame callbacks.
    pub scheduler: Box<dyn FrameScheduler>,
    /// Input listener registration.
    pub input: Box<dyn InputHost>,
    /// Frame consumer.
    pub sink: Box<dyn RenderSink>,
}

/// The creature simulation, driven one frame at a time by the host.
pub struct Engine {
    world: World,
    clock: Rc<dyn Clock>,
    scheduler: Box<dyn FrameScheduler>,
    input: Box<dyn InputHost>,
    sink: Box<dyn RenderSink>,
    state: EngineState,
    visible: bool,
    pending_frame: Option<FrameHandle>,
    listener: Option<ListenerId>,
    last_frame: Option<Instant>,
    frame: u64,
    last_snapshot: Option<FrameSnapshot>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("visible", &self.visible)
            .field("frame", &self.frame)
            .field("world", &self.world)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine for a `width` x `height` surface.
    ///
    /// Memory is loaded (and decayed) immediately; storage problems fall
    /// back to a fresh creature and never fail construction.
    ///
    /// # Errors
    /// Returns [`glimmer_core::GlimmerError::Config`] when a tunable is out
    /// of range, and [`glimmer_core::GlimmerError::InvalidSurface`] when the
    /// surface is too small or not finite. No engine is created.
    pub fn new(config: GlimmerConfig, width: f32, height: f32, services: EngineServices) -> Result<Self> {
        config.validate()?;
        let bounds = Bounds::new(width, height, config.creature.boundary_margin)?;
        let now = services.clock.now_ms();

        let memory = MemorySystem::load(services.store, Rc::clone(&services.clock), config.memory.clone());
        let rng = config
            .general
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        let mut creature = CreatureState::new(bounds.center(), now, config.creature.trail_capacity);
        if config.accessibility.reduce_motion {
            creature.rest();
        }

        info!(
            width,
            height,
            trust = memory.trust_level(),
            reduce_motion = config.accessibility.reduce_motion,
            "Engine created"
        );

        Ok(Self {
            world: World {
                particles: ParticleSystem::new(config.particles.clone()),
                emotion: EmotionEngine::new(config.emotion.clone()),
                recall: MemoryRecall::default(),
                cursor: CursorTracker::default(),
                started_ms: now,
                creature,
                memory,
                rng,
                bounds,
                config,
            },
            clock: services.clock,
            scheduler: services.scheduler,
            input: services.input,
            sink: services.sink,
            state: EngineState::Idle,
            visible: true,
            pending_frame: None,
            listener: None,
            last_frame: None,
            frame: 0,
            last_snapshot: None,
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start ticking. Registers input listeners the first time. Calling it
    /// while running (or after destroy) does nothing.
    pub fn start(&mut self) {
        match self.state {
            EngineState::Running | EngineState::Paused | EngineState::Destroyed => return,
            EngineState::Idle | EngineState::Stopped | EngineState::Faulted => {}
        }

        if self.listener.is_none() {
            self.listener = Some(self.input.subscribe(&InputKind::ALL));
        }
        self.last_frame = None;

        if self.visible {
            self.state = EngineState::Running;
            self.schedule();
        } else {
            self.state = EngineState::Paused;
        }
        info!(state = ?self.state, "Engine started");
    }

    /// Stop ticking. State and listeners are kept; a second call is a no-op.
    pub fn stop(&mut self) {
        if !matches!(self.state, EngineState::Running | EngineState::Paused) {
            return;
        }
        self.cancel_pending();
        self.state = EngineState::Stopped;
        info!(frame = self.frame, "Engine stopped");
    }

    /// Tear down: cancel the pending frame, write memory out and release
    /// every listener the engine registered.
    pub fn destroy(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        self.cancel_pending();

        let pattern = self.world.creature.pattern;
        self.world.memory.set_behavior_pattern(pattern.tag());
        self.world.memory.flush();

        if let Some(id) = self.listener.take() {
            self.input.unsubscribe(id);
        }
        self.state = EngineState::Destroyed;
        info!(
            frame = self.frame,
            trust = self.world.memory.trust_level(),
            "Engine destroyed"
        );
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    fn schedule(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    /// Run one frame at monotonic time `now`. Called by the host when the
    /// frame it was asked for fires.
    pub fn on_frame(&mut self, now: Instant) {
        self.pending_frame = None;
        if !matches!(self.state, EngineState::Running | EngineState::Paused) {
            return;
        }

        // 1. Timing.
        let delta_ms = self.last_frame.map_or(FRAME_MS, |prev| {
            #[allow(clippy::cast_possible_truncation)]
            let ms = now.saturating_duration_since(prev).as_secs_f64() as f32 * 1_000.0;
            ms.min(MAX_DELTA_MS)
        });
        self.last_frame = Some(now);
        let now_ms = self.clock.now_ms();

        // 2. Rest frames.
        if self.state == EngineState::Paused || self.world.config.accessibility.reduce_motion {
            self.emit(true);
            if self.state == EngineState::Running {
                self.schedule();
            }
            return;
        }

        // 3-9.
        let world = &mut self.world;
        let outcome = catch_unwind(AssertUnwindSafe(|| systems::tick(world, delta_ms, now_ms)));
        match outcome {
            Ok(_) if self.world.creature.is_finite() => {}
            Ok(_) => {
                self.fault("creature state became non-finite");
                return;
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                self.fault(&reason);
                return;
            }
        }

        // 10-11.
        self.emit(false);
        self.schedule();
    }

    fn emit(&mut self, resting: bool) {
        let snapshot = FrameSnapshot::capture(
            self.frame,
            &self.world.creature,
            &self.world.particles,
            self.world.emotion.state(),
            self.world.memory.trust_level(),
            resting,
        );
        self.sink.present(&snapshot);
        self.last_snapshot = Some(snapshot);
        self.frame += 1;
    }

    fn fault(&mut self, reason: &str) {
        error!(reason, frame = self.frame, "Tick failed; stopping engine");
        self.cancel_pending();
        let center = self.world.bounds.center();
        self.world.creature.respawn(center);
        self.world.emotion.finish_tick();
        self.state = EngineState::Faulted;
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Deliver a host input event. Ignored unless the engine has registered
    /// its listeners (between the first `start` and `destroy`). Returns
    /// whether the event was accepted.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if self.listener.is_none() {
            return false;
        }
        match event {
            InputEvent::PointerMove { position } => {
                if self.world.cursor.move_to(position) {
                    self.world.memory.record_interaction(InteractionKind::Move);
                }
            }
            InputEvent::PointerDown { position } => self.tap(position),
            InputEvent::PointerLeave => self.world.cursor.leave(),
            InputEvent::VisibilityChange { visible } => self.set_visible(visible),
        }
        true
    }

    fn tap(&mut self, position: Vec2) {
        let now = self.clock.now_ms();
        let w = &mut self.world;
        w.particles.add_ripple(position);
        w.particles.add_food(position, now, &mut w.rng);
        w.memory.record_interaction(InteractionKind::Tap);
        w.emotion.force(Mood::Excited, 1.0);
        debug!(x = position.x, y = position.y, "Tap");
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        match (visible, self.state) {
            (false, EngineState::Running) => {
                self.cancel_pending();
                self.state = EngineState::Paused;
                debug!("Hidden; pausing");
            }
            (true, EngineState::Paused) => {
                self.state = EngineState::Running;
                self.last_frame = None;
                self.schedule();
                debug!("Visible; resuming");
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Configuration surface and queries
    // -----------------------------------------------------------------------

    /// Change the surface size. The creature is pulled back inside if the
    /// new surface is smaller.
    ///
    /// # Errors
    /// Returns [`glimmer_core::GlimmerError::InvalidSurface`] and keeps the
    /// old size when the new one is unusable.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let margin = self.world.config.creature.boundary_margin;
        let bounds = Bounds::new(width, height, margin).inspect_err(|e| {
            warn!(error = %e, "Ignoring resize");
        })?;
        self.world.bounds = bounds;
        let c = &mut self.world.creature;
        c.position = c
            .position
            .clamp(Vec2::splat(margin), Vec2::new(width - margin, height - margin));
        debug!(width, height, "Resized");
        Ok(())
    }

    /// Forget the stored memory and start over with a fresh creature.
    pub fn reset_memory(&mut self) {
        self.world.memory.reset();
        self.world.recall.forget();
    }

    /// Current trust in `[0, 100]`.
    #[must_use]
    pub fn trust_level(&self) -> f32 {
        self.world.memory.trust_level()
    }

    /// Current mood.
    #[must_use]
    pub fn current_mood(&self) -> Mood {
        self.world.emotion.mood()
    }

    /// Prior emotional states, oldest first.
    pub fn mood_history(&self) -> impl Iterator<Item = &EmotionalState> {
        self.world.emotion.history()
    }

    /// Summary for status displays.
    #[must_use]
    pub fn creature_stats(&self) -> CreatureStats {
        let record = self.world.memory.record();
        CreatureStats {
            trust: record.trust_level,
            mood: self.world.emotion.mood(),
            interactions: record.interaction_count,
            feeding_spots: record.feeding_spots.len(),
            time_since_last_fed_ms: self.clock.now_ms().saturating_sub(self.world.creature.last_fed_ms).max(0),
        }
    }

    /// The most recently emitted frame.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&FrameSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Read access to the simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access to the simulated world, for hosts that script scenes.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
