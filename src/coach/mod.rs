//! The coach: ritual sequencing, input arbitration, and the task loop.
//!
//! ```text
//! CoachHandle ──▶ CoachRunner::run ──▶ RitualStepSequencer ──▶ narration / haptics / event log
//!                                            │
//!                                            └──▶ InputArbiter ──▶ tap | voice | motion
//! ```

pub mod arbiter;
pub mod runner;
pub mod sequencer;
pub mod state;
pub mod transition;

pub use arbiter::{InputArbiter, InputEvent, InputSignal};
pub use runner::{CoachCommand, CoachEvent, CoachHandle, CoachRunner};
pub use sequencer::{CoachError, RitualStepSequencer};
pub use state::{
    new_shared_state, CoachSnapshot, CoachState, InputStatus, SharedState, StopSignal,
};
pub use transition::{plan_advance, AdvancePlan, Effect, Position};
