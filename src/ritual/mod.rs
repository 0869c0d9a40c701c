//! Static prayer definitions.
//!
//! * [`Posture`] — closed set of stances used by steps and the pose classifier.
//! * [`RitualStep`] — immutable narration unit.
//! * [`RitualTemplate`] — the per-rakat cycle plus the closing sequence.

pub mod step;
pub mod templates;

pub use step::{Posture, RitualStep, RitualTemplate};
pub use templates::{default_template, CLOSING_STEPS, CYCLE_STEPS};
