//! Pure transition planning.
//!
//! Nothing here touches audio, haptics, or storage.  [`plan_advance`]
//! decides where an advance leads; the `*_effects` builders describe the
//! side effects of entering a step as an ordered list of [`Effect`]s
//! (always log → haptic → narrate), which the sequencer then executes.

use serde_json::{json, Value};

use crate::config::{CoachConfiguration, InputMode};
use crate::eventlog::EventKind;
use crate::narration::SpeechSegment;
use crate::ritual::{RitualStep, RitualTemplate};

// ---------------------------------------------------------------------------
// Position / AdvancePlan
// ---------------------------------------------------------------------------

/// Place in the prayer: 1-based cycle, 0-based step within the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub cycle: u32,
    pub step_index: usize,
}

impl Position {
    pub const START: Position = Position {
        cycle: 1,
        step_index: 0,
    };
}

/// Outcome of an advance from a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePlan {
    /// Move to this position.
    Next(Position),
    /// Last step of the last cycle: run the closing sequence.
    Finalize,
}

/// Where an advance from `at` leads.
///
/// ```
/// use prayer_coach::coach::{plan_advance, AdvancePlan, Position};
///
/// let last = Position { cycle: 2, step_index: 5 };
/// assert_eq!(plan_advance(last, 6, 2), AdvancePlan::Finalize);
/// ```
pub fn plan_advance(at: Position, steps_per_cycle: usize, total_cycles: u32) -> AdvancePlan {
    if at.step_index + 1 < steps_per_cycle {
        AdvancePlan::Next(Position {
            cycle: at.cycle,
            step_index: at.step_index + 1,
        })
    } else if at.cycle < total_cycles {
        AdvancePlan::Next(Position {
            cycle: at.cycle + 1,
            step_index: 0,
        })
    } else {
        AdvancePlan::Finalize
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// One side effect, executed in list order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Log(EventKind, Value),
    Haptic,
    Narrate(Vec<SpeechSegment>),
}

/// Primary narration followed by the sacred-language text and recitations
/// (only when a sacred language is configured).
pub fn step_segments(step: &RitualStep, config: &CoachConfiguration) -> Vec<SpeechSegment> {
    let gender = config.voice_gender;
    let mut segments = vec![SpeechSegment::new(
        step.narration,
        config.language.as_str(),
        gender,
    )];

    if let Some(sacred) = config.sacred_language.as_deref() {
        segments.extend(
            step.sacred_text
                .iter()
                .chain(step.recitations.iter())
                .map(|text| SpeechSegment::new(*text, sacred, gender)),
        );
    }

    segments
}

pub fn step_payload(step: &RitualStep, at: Position) -> Value {
    json!({
        "cycle": at.cycle,
        "step_index": at.step_index,
        "step": step.id,
        "posture": step.posture,
    })
}

/// Effects of entering `step` at `at`, logged as `kind`.
///
/// The first step of every cycle after the first is preceded by a short
/// rakat announcement.
pub fn enter_step_effects(
    kind: EventKind,
    step: &RitualStep,
    at: Position,
    config: &CoachConfiguration,
) -> Vec<Effect> {
    let mut segments = Vec::new();
    if kind == EventKind::NextStep && at.step_index == 0 {
        segments.push(SpeechSegment::new(
            format!("Rakat {} of {}.", at.cycle, config.total_rakat),
            config.language.as_str(),
            config.voice_gender,
        ));
    }
    segments.extend(step_segments(step, config));

    vec![
        Effect::Log(kind, step_payload(step, at)),
        Effect::Haptic,
        Effect::Narrate(segments),
    ]
}

/// Effects of `start`: the configuration, the start marker, then the opening
/// announcement voiced together with the first step.
pub fn start_effects(config: &CoachConfiguration, first: &RitualStep) -> Vec<Effect> {
    let config_payload = serde_json::to_value(config).unwrap_or(Value::Null);

    let mut segments = vec![SpeechSegment::new(
        opening_announcement(config),
        config.language.as_str(),
        config.voice_gender,
    )];
    segments.extend(step_segments(first, config));

    vec![
        Effect::Log(EventKind::Config, config_payload),
        Effect::Log(
            EventKind::Start,
            json!({
                "mode": config.mode.as_str(),
                "total_rakat": config.total_rakat,
            }),
        ),
        Effect::Haptic,
        Effect::Narrate(segments),
    ]
}

/// One effect group per closing step, each `[log, haptic, narrate]`.
pub fn finalization_effects(
    template: &RitualTemplate,
    config: &CoachConfiguration,
) -> Vec<Vec<Effect>> {
    template
        .closing
        .iter()
        .enumerate()
        .map(|(index, step)| {
            vec![
                Effect::Log(
                    EventKind::FinalizationStep,
                    json!({ "index": index, "step": step.id, "posture": step.posture }),
                ),
                Effect::Haptic,
                Effect::Narrate(step_segments(step, config)),
            ]
        })
        .collect()
}

pub fn completion_segments(config: &CoachConfiguration) -> Vec<SpeechSegment> {
    vec![SpeechSegment::new(
        "Your prayer is complete. May it be accepted.",
        config.language.as_str(),
        config.voice_gender,
    )]
}

fn opening_announcement(config: &CoachConfiguration) -> String {
    let how = match config.mode {
        InputMode::Manual => "Tap the phone three times to move to the next step.",
        InputMode::Voice => "Say next to continue, or repeat to hear a step again.",
        InputMode::Motion if config.auto_advance_from_pose => {
            "Move through each position and the coach will follow your posture."
        }
        InputMode::Motion => "Keep the phone with you as you pray.",
    };
    format!(
        "Starting a prayer of {} rakat. {how}",
        config.total_rakat
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
