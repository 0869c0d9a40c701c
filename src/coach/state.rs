//! Coach state and the snapshot shared with the presentation layer.
//!
//! [`CoachState`] is owned by the sequencer and mutated only by its
//! transition operations.  After every mutation the sequencer copies it,
//! together with detector status, into a [`CoachSnapshot`] behind
//! [`SharedState`] (`Arc<Mutex<…>>`) for the UI to read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::InputMode;
use crate::ritual::RitualStep;
use crate::sensors::MotionPoseReading;

use super::transition::Position;

// ---------------------------------------------------------------------------
// CoachState
// ---------------------------------------------------------------------------

/// Position and lifecycle of the current session.
///
/// ```text
/// inactive ──start──▶ active ──advance × (steps × rakat − 1)──▶ last step
///                        │                                        │
///                        └──stop──▶ finished        advance ──▶ finished
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CoachState {
    pub active: bool,
    /// 1-based rakat index.
    pub current_cycle: u32,
    /// Index into the cycle template.
    pub current_step_index: usize,
    /// The template step at `current_step_index`.
    pub current_step: Option<&'static RitualStep>,
    pub finished: bool,
}

impl Default for CoachState {
    fn default() -> Self {
        Self {
            active: false,
            current_cycle: 1,
            current_step_index: 0,
            current_step: None,
            finished: false,
        }
    }
}

impl CoachState {
    pub fn position(&self) -> Position {
        Position {
            cycle: self.current_cycle,
            step_index: self.current_step_index,
        }
    }

    /// `true` while transitions may still happen.
    pub fn accepts_transitions(&self) -> bool {
        self.active && !self.finished
    }
}

// ---------------------------------------------------------------------------
// StopSignal
// ---------------------------------------------------------------------------

/// Flag raised the moment a stop is requested, before the stop command
/// reaches the coach task.  The finalization sequence checks it between
/// closing steps.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Detector-side state surfaced to the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputStatus {
    /// Modality currently started, `None` when all are stopped.
    pub mode: Option<InputMode>,
    pub voice_listening: bool,
    pub voice_partial: String,
    pub voice_error: Option<String>,
    pub tap_error: Option<String>,
    pub motion_error: Option<String>,
    pub pose: Option<MotionPoseReading>,
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoachSnapshot {
    pub coach: CoachState,
    /// Rakat count of the current (or last) session; 0 before the first start.
    pub total_rakat: u32,
    pub inputs: InputStatus,
}

/// Thread-safe handle to [`CoachSnapshot`].
///
/// Lock for a short critical section; do **not** hold the lock across
/// `.await` points.
pub type SharedState = Arc<Mutex<CoachSnapshot>>;

pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(CoachSnapshot::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
