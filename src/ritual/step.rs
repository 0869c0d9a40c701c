//! Step and template definitions.
//!
//! Steps are `'static` data: they are defined once in [`crate::ritual::templates`]
//! and the coach refers to them by reference for the whole session.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Posture
// ---------------------------------------------------------------------------

/// Physical stance, shared by step definitions and sensor-inferred pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    Standing,
    Bowing,
    Prostrate,
    Sitting,
}

impl Posture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Posture::Standing => "standing",
            Posture::Bowing => "bowing",
            Posture::Prostrate => "prostrate",
            Posture::Sitting => "sitting",
        }
    }
}

// ---------------------------------------------------------------------------
// RitualStep
// ---------------------------------------------------------------------------

/// One posture + narration unit of the prayer.
#[derive(Debug, PartialEq, Eq)]
pub struct RitualStep {
    /// Stable identifier written to the event log.
    pub id: &'static str,
    /// Expected posture while the step is performed.
    pub posture: Posture,
    /// Instruction narrated in the primary language.
    pub narration: &'static str,
    /// Sacred-language text recited after the instruction.
    pub sacred_text: Option<&'static str>,
    /// Further sacred-language recitations, voiced in order after
    /// `sacred_text`.
    pub recitations: &'static [&'static str],
    /// Short hint for the presentation layer.
    pub hint: &'static str,
}

// ---------------------------------------------------------------------------
// RitualTemplate
// ---------------------------------------------------------------------------

/// The cycle shared by every rakat plus the closing sequence.
#[derive(Debug, Clone, Copy)]
pub struct RitualTemplate {
    /// Steps performed in every cycle, in order.
    pub cycle: &'static [RitualStep],
    /// Steps performed once after the last cycle.
    pub closing: &'static [RitualStep],
}

impl RitualTemplate {
    pub fn steps_per_cycle(&self) -> usize {
        self.cycle.len()
    }

    /// Step at `index` of the cycle, if it exists.
    pub fn cycle_step(&self, index: usize) -> Option<&'static RitualStep> {
        self.cycle.get(index)
    }

    /// Index of the last step in a cycle, `None` for an empty template.
    pub fn last_step_index(&self) -> Option<usize> {
        self.cycle.len().checked_sub(1)
    }
}
