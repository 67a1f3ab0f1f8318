//! Host seams: frame scheduling, input listener registration and the
//! render sink.
//!
//! The engine never reaches for globals. Whatever environment embeds it
//! supplies these three services; the engine registers and releases its
//! own listeners and frame requests through them.
//!
//! The `Manual*` and `Recording*` implementations keep their state behind
//! a shared handle, so a caller can hold a clone while the engine owns
//! another. The headless binary and the tests drive the engine with them.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use glimmer_core::snapshot::FrameSnapshot;

use crate::events::InputKind;

/// Ticket for a requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// Ticket for a listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Requests one callback on the host's next frame.
pub trait FrameScheduler {
    /// Ask for the next frame. The host later calls `Engine::on_frame`.
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Registers the engine for input delivery.
pub trait InputHost {
    /// Start delivering events of the given kinds.
    fn subscribe(&mut self, kinds: &[InputKind]) -> ListenerId;
    /// Stop delivering events for `id`.
    fn unsubscribe(&mut self, id: ListenerId);
}

/// Receives one snapshot per frame.
pub trait RenderSink {
    /// Draw (or forward) a frame.
    fn present(&mut self, snapshot: &FrameSnapshot);
}

// ---------------------------------------------------------------------------
// ManualScheduler
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SchedulerState {
    next: u64,
    pending: Option<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

/// Scheduler whose frames fire only when the caller says so.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl ManualScheduler {
    /// Scheduler with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame has been requested and not yet fired or cancelled.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Consume the pending request, returning whether there was one.
    pub fn fire(&self) -> bool {
        self.state.borrow_mut().pending.take().is_some()
    }

    /// Total frames requested.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.state.borrow().requested
    }

    /// Total requests cancelled.
    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut s = self.state.borrow_mut();
        s.next += 1;
        s.requested += 1;
        let handle = FrameHandle(s.next);
        s.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut s = self.state.borrow_mut();
        if s.pending == Some(handle) {
            s.pending = None;
            s.cancelled += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingInput
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct InputState {
    next: u64,
    active: BTreeSet<ListenerId>,
    kinds: Vec<InputKind>,
}

/// Input host that just tracks which listeners are registered.
#[derive(Debug, Clone, Default)]
pub struct RecordingInput {
    state: Rc<RefCell<InputState>>,
}

impl RecordingInput {
    /// No listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live registrations.
    #[must_use]
    pub fn active(&self) -> usize {
        self.state.borrow().active.len()
    }

    /// Kinds requested by the latest registration.
    #[must_use]
    pub fn kinds(&self) -> Vec<InputKind> {
        self.state.borrow().kinds.clone()
    }
}

impl InputHost for RecordingInput {
    fn subscribe(&mut self, kinds: &[InputKind]) -> ListenerId {
        let mut s = self.state.borrow_mut();
        s.next += 1;
        let id = ListenerId(s.next);
        s.active.insert(id);
        s.kinds = kinds.to_vec();
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.state.borrow_mut().active.remove(&id);
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Discards every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn present(&mut self, _snapshot: &FrameSnapshot) {}
}

/// Keeps the most recent frames.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    frames: Rc<RefCell<Vec<FrameSnapshot>>>,
}

impl RecordingSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames presented.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Whether nothing was presented yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    /// The latest frame.
    #[must_use]
    pub fn last(&self) -> Option<FrameSnapshot> {
        self.frames.borrow().last().cloned()
    }

    /// Drain every recorded frame.
    pub fn take(&self) -> Vec<FrameSnapshot> {
        std::mem::take(&mut *self.frames.borrow_mut())
    }
}

impl RenderSink for RecordingSink {
    fn present(&mut self, snapshot: &FrameSnapshot) {
        self.frames.borrow_mut().push(snapshot.clone());
    }
}
