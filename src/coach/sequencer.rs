//! Ritual step sequencer.
//!
//! Owns [`CoachState`] and the [`InputArbiter`].  Every transition is
//! planned by the pure helpers in [`super::transition`] and then executed
//! effect by effect: log first, then a haptic pulse, then narration, which
//! is awaited to completion before the call returns.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;

use crate::config::CoachConfiguration;
use crate::eventlog::{EventKind, EventLog};
use crate::narration::{AudioMode, HapticFeedback, SpeechNarrator};
use crate::ritual::RitualTemplate;

use super::arbiter::{InputArbiter, InputEvent, InputSignal};
use super::state::{CoachState, SharedState, StopSignal};
use super::transition::{
    completion_segments, enter_step_effects, finalization_effects, plan_advance, start_effects,
    step_payload, AdvancePlan, Effect, Position,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoachError {
    #[error("total rakat must be at least 1 (got {0})")]
    InvalidCycleCount(u32),

    #[error("ritual template has no cycle steps")]
    EmptyTemplate,

    #[error("coach task is not running")]
    Closed,
}

pub struct RitualStepSequencer {
    template: RitualTemplate,
    config: Option<CoachConfiguration>,
    state: CoachState,
    arbiter: InputArbiter,
    narrator: SpeechNarrator,
    haptics: Arc<dyn HapticFeedback>,
    log: EventLog,
    shared: SharedState,
    stop_signal: StopSignal,
}

impl RitualStepSequencer {
    pub fn new(
        template: RitualTemplate,
        arbiter: InputArbiter,
        narrator: SpeechNarrator,
        haptics: Arc<dyn HapticFeedback>,
        log: EventLog,
        shared: SharedState,
    ) -> Self {
        Self {
            template,
            config: None,
            state: CoachState::default(),
            arbiter,
            narrator,
            haptics,
            log,
            shared,
            stop_signal: StopSignal::default(),
        }
    }

    pub fn state(&self) -> &CoachState {
        &self.state
    }

    pub fn arbiter(&self) -> &InputArbiter {
        &self.arbiter
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop_signal.clone()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Begin a session at cycle 1, step 0.
    ///
    /// Logs the configuration, narrates the opening together with the first
    /// step, then activates the configured input modality.  An invalid
    /// configuration leaves the current state untouched.
    pub async fn start(&mut self, config: CoachConfiguration) -> Result<(), CoachError> {
        if config.total_rakat == 0 {
            return Err(CoachError::InvalidCycleCount(config.total_rakat));
        }
        let first = self.template.cycle_step(0).ok_or(CoachError::EmptyTemplate)?;

        self.stop_signal.clear();
        self.state = CoachState {
            active: true,
            current_cycle: 1,
            current_step_index: 0,
            current_step: Some(first),
            finished: false,
        };
        self.config = Some(config.clone());
        self.publish();
        log::info!(
            "coach: starting {} rakat, {} input",
            config.total_rakat,
            config.mode.as_str()
        );

        self.execute(&start_effects(&config, first)).await;
        self.arbiter
            .activate(config.mode, &config, &self.narrator)
            .await;
        self.publish();
        Ok(())
    }

    /// Move to the next step, the next cycle, or run the closing sequence.
    /// No-op unless a session is running.
    pub async fn advance(&mut self) {
        if !self.state.accepts_transitions() || self.stop_signal.is_raised() {
            return;
        }
        let Some(config) = self.config.clone() else {
            return;
        };

        let plan = plan_advance(
            self.state.position(),
            self.template.steps_per_cycle(),
            config.total_rakat,
        );
        match plan {
            AdvancePlan::Next(at) => self.enter(at, &config).await,
            AdvancePlan::Finalize => self.finalize(&config).await,
        }
    }

    /// Narrate the current step again without moving.
    pub async fn repeat(&mut self) {
        if !self.state.accepts_transitions() || self.stop_signal.is_raised() {
            return;
        }
        let (Some(config), Some(step)) = (self.config.clone(), self.state.current_step) else {
            return;
        };

        let effects =
            enter_step_effects(EventKind::RepeatStep, step, self.state.position(), &config);
        self.execute(&effects).await;
    }

    /// End the session: deactivate every input and restore playback routing.
    ///
    /// An active session is frozen as finished, the same as on completion;
    /// the `stop` event's reason tells the two apart.  Safe to call at any
    /// time; only an active session logs a stop.
    pub async fn stop(&mut self) {
        self.stop_signal.raise();
        let was_active = self.state.active;
        self.state.active = false;
        if was_active {
            self.state.finished = true;
        }
        self.publish();

        if was_active {
            self.log
                .record(EventKind::Stop, json!({ "reason": "user" }))
                .await;
            log::info!("coach: stopped by user");
        }

        self.release_inputs().await;
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    /// Route a raw input through the arbiter and act on what it recognised.
    ///
    /// With `suppressed` set, detectors still update but advance and repeat
    /// signals are dropped; the same holds once a stop has been requested.
    /// At most one transition happens per call.  Returns `true` when a
    /// transition (and its narration) ran.
    pub async fn handle_input(&mut self, input: InputEvent, suppressed: bool) -> bool {
        let expected = self.state.current_step.map(|step| step.posture);
        let signals = self.arbiter.handle(input, expected);
        self.publish();

        let mut transitioned = false;
        for signal in signals {
            let blocked = suppressed
                || transitioned
                || self.stop_signal.is_raised()
                || !self.state.accepts_transitions();
            match signal {
                InputSignal::PoseReading { payload } => {
                    self.log.record(EventKind::PoseReading, payload).await;
                }
                InputSignal::Advance { kind, payload } => {
                    if blocked {
                        log::debug!("coach: dropped {kind:?} signal");
                        continue;
                    }
                    self.log.record(kind, payload).await;
                    self.advance().await;
                    transitioned = true;
                }
                InputSignal::Repeat { payload } => {
                    if blocked {
                        log::debug!("coach: dropped repeat signal");
                        continue;
                    }
                    self.log.record(EventKind::VoiceCommand, payload).await;
                    self.repeat().await;
                    transitioned = true;
                }
            }
        }
        transitioned
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn enter(&mut self, at: Position, config: &CoachConfiguration) {
        let Some(step) = self.template.cycle_step(at.step_index) else {
            log::warn!("coach: no template step at index {}", at.step_index);
            return;
        };
        self.state.current_cycle = at.cycle;
        self.state.current_step_index = at.step_index;
        self.state.current_step = Some(step);
        self.publish();

        self.execute(&enter_step_effects(EventKind::NextStep, step, at, config))
            .await;
    }

    /// Closing steps in order, then the completion message.  A stop request
    /// abandons the remainder between steps.
    async fn finalize(&mut self, config: &CoachConfiguration) {
        log::info!("coach: final step reached, closing");
        for group in finalization_effects(&self.template, config) {
            if self.stop_signal.is_raised() {
                log::info!("coach: closing sequence interrupted");
                return;
            }
            self.execute(&group).await;
        }
        if self.stop_signal.is_raised() {
            log::info!("coach: closing sequence interrupted");
            return;
        }

        self.narrator
            .speak_segments(&completion_segments(config))
            .await;

        self.state.active = false;
        self.state.finished = true;
        self.publish();

        let last = self
            .state
            .current_step
            .map(|step| step_payload(step, self.state.position()));
        self.log
            .record(
                EventKind::Stop,
                json!({ "reason": "complete", "last": last }),
            )
            .await;
        log::info!("coach: prayer complete");

        self.release_inputs().await;
    }

    async fn release_inputs(&mut self) {
        self.arbiter.deactivate_all().await;
        self.narrator.set_audio_mode(AudioMode::Playback).await;
        self.publish();
    }

    async fn execute(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Log(kind, payload) => self.log.record(*kind, payload.clone()).await,
                Effect::Haptic => {
                    if let Err(e) = self.haptics.trigger().await {
                        log::debug!("coach: haptic pulse failed: {e}");
                    }
                }
                Effect::Narrate(segments) => self.narrator.speak_segments(segments).await,
            }
        }
    }

    fn publish(&self) {
        if let Ok(mut snapshot) = self.shared.lock() {
            snapshot.coach = self.state.clone();
            snapshot.total_rakat = self.config.as_ref().map_or(0, |c| c.total_rakat);
            snapshot.inputs = self.arbiter.status();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, InputMode};
    use crate::diagnostics::MemoryRecorder;
    use crate::eventlog::MemoryLogStore;
    use crate::narration::{CountingHaptics, HapticError, RecordingTts};
    use crate::ritual::{default_template, CLOSING_STEPS};
    use crate::coach::state::new_shared_state;
    use crate::sensors::{AccelSample, RecordingSensorSource, SensorCall, SensorKind};
    use crate::voice::{MockRecognizer, SpeechEvent};
    use async_trait::async_trait;

    struct Harness {
        tts: Arc<RecordingTts>,
        haptics: Arc<CountingHaptics>,
        sensors: Arc<RecordingSensorSource>,
        speech: Arc<MockRecognizer>,
        log: EventLog,
        shared: SharedState,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_tts(RecordingTts::default())
        }

        fn with_tts(tts: RecordingTts) -> Self {
            Self {
                tts: Arc::new(tts),
                haptics: Arc::new(CountingHaptics::default()),
                sensors: Arc::new(RecordingSensorSource::default()),
                speech: Arc::new(MockRecognizer::default()),
                log: EventLog::new(Arc::new(MemoryLogStore::new()), "test"),
                shared: new_shared_state(),
            }
        }

        fn sequencer(&self) -> RitualStepSequencer {
            self.sequencer_with(default_template(), self.haptics.clone())
        }

        fn sequencer_with(
            &self,
            template: RitualTemplate,
            haptics: Arc<dyn HapticFeedback>,
        ) -> RitualStepSequencer {
            let arbiter = InputArbiter::from_config(
                &AppConfig::default(),
                self.sensors.clone(),
                self.speech.clone(),
                Arc::new(MemoryRecorder::default()),
            );
            RitualStepSequencer::new(
                template,
                arbiter,
                SpeechNarrator::new(self.tts.clone()),
                haptics,
                self.log.clone(),
                self.shared.clone(),
            )
        }

        async fn kinds(&self) -> Vec<EventKind> {
            self.log.read_all().await.into_iter().map(|e| e.kind).collect()
        }
    }

    fn config(mode: InputMode, total_rakat: u32) -> CoachConfiguration {
        CoachConfiguration {
            mode,
            total_rakat,
            ..CoachConfiguration::default()
        }
    }

    fn spike(t: u64) -> InputEvent {
        InputEvent::Acceleration(AccelSample::new(t, [0.0, 0.0, 3.5]))
    }

    #[tokio::test]
    async fn start_positions_at_first_step() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Manual, 2)).await.unwrap();

        let s = seq.state();
        assert!(s.active);
        assert!(!s.finished);
        assert_eq!(s.position(), Position::START);
        assert_eq!(s.current_step.map(|st| st.id), Some("takbir"));

        assert_eq!(h.kinds().await, vec![EventKind::Config, EventKind::Start]);
        assert_eq!(h.haptics.count(), 1);
        assert!(h.tts.spoken()[0].starts_with("Starting a prayer of 2 rakat."));

        let snap = h.shared.lock().unwrap().clone();
        assert!(snap.coach.active);
        assert_eq!(snap.total_rakat, 2);
        assert_eq!(snap.inputs.mode, Some(InputMode::Manual));
    }

    #[tokio::test]
    async fn two_rakat_finishes_on_twelfth_advance() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Manual, 2)).await.unwrap();

        for i in 1..=11 {
            seq.advance().await;
            assert!(!seq.state().finished, "finished early after {i} advances");
        }
        assert_eq!(seq.state().position(), Position { cycle: 2, step_index: 5 });

        seq.advance().await;
        assert!(seq.state().finished);
        assert!(!seq.state().active);
    }

    #[tokio::test]
    async fn advances_follow_template_order_into_second_rakat() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Manual, 2)).await.unwrap();

        let template = default_template();
        for step in 1..6 {
            seq.advance().await;
            assert_eq!(seq.state().position(), Position { cycle: 1, step_index: step });
            assert_eq!(
                seq.state().current_step.map(|s| s.id),
                Some(template.cycle[step].id)
            );
        }

        seq.advance().await;
        assert_eq!(seq.state().position(), Position { cycle: 2, step_index: 0 });
        assert_eq!(seq.state().current_step.map(|s| s.id), Some("takbir"));
        assert!(h.tts.spoken().contains(&"Rakat 2 of 2.".to_string()));
    }

    #[tokio::test]
    async fn advance_count_holds_for_any_cycle_count() {
        for total in [1, 3, 4] {
            let h = Harness::new();
            let mut seq = h.sequencer();
            seq.start(config(InputMode::Manual, total)).await.unwrap();

            let mut advances = 0;
            while !seq.state().finished {
                seq.advance().await;
                advances += 1;
                assert!(advances <= 6 * total, "never finished for {total} rakat");
            }
            assert_eq!(advances, 6 * total);
        }
    }

    #[tokio::test]
    async fn repeat_keeps_position_and_renarrates() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Manual, 2)).await.unwrap();
        seq.advance().await;
        seq.advance().await;
        let before = seq.state().clone();
        let narrated = h.tts.spoken().len();

        seq.repeat().await;

        assert_eq!(seq.state(), &before);
        let spoken = h.tts.spoken();
        assert_eq!(spoken[narrated], before.current_step.unwrap().narration);
        assert_eq!(h.kinds().await.last(), Some(&EventKind::RepeatStep));
        assert_eq!(h.haptics.count(), 4);
    }

    #[tokio::test]
    async fn finished_session_ignores_transitions() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Manual, 1)).await.unwrap();
        for _ in 0..6 {
            seq.advance().await;
        }
        assert!(seq.state().finished);

        let events = h.log.read_all().await.len();
        let spoken = h.tts.spoken().len();
        let finished = seq.state().clone();

        seq.advance().await;
        seq.repeat().await;

        assert_eq!(seq.state(), &finished);
        assert_eq!(h.log.read_all().await.len(), events);
        assert_eq!(h.tts.spoken().len(), spoken);
    }

    #[tokio::test]
    async fn finalization_narrates_closing_steps_then_completion() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        let mut cfg = config(InputMode::Manual, 1);
        cfg.sacred_language = None;
        seq.start(cfg).await.unwrap();
        for _ in 0..5 {
            seq.advance().await;
        }
        let before = h.tts.spoken().len();

        seq.advance().await;

        let spoken = h.tts.spoken()[before..].to_vec();
        let mut expected: Vec<String> = CLOSING_STEPS
            .iter()
            .map(|step| step.narration.to_string())
            .collect();
        expected.push("Your prayer is complete. May it be accepted.".to_string());
        assert_eq!(spoken, expected);

        let kinds = h.kinds().await;
        let tail = &kinds[kinds.len() - 4..];
        assert_eq!(
            tail,
            &[
                EventKind::FinalizationStep,
                EventKind::FinalizationStep,
                EventKind::FinalizationStep,
                EventKind::Stop,
            ]
        );
        assert_eq!(h.tts.modes().last(), Some(&AudioMode::Playback));
    }

    #[tokio::test]
    async fn invalid_configuration_is_rejected() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        let err = seq.start(config(InputMode::Manual, 0)).await.unwrap_err();
        assert_eq!(err, CoachError::InvalidCycleCount(0));
        assert!(!seq.state().active);
        assert!(h.log.read_all().await.is_empty());
        assert!(h.tts.spoken().is_empty());

        let empty = RitualTemplate {
            cycle: &[],
            closing: &CLOSING_STEPS,
        };
        let mut seq = h.sequencer_with(empty, h.haptics.clone());
        let err = seq.start(config(InputMode::Manual, 2)).await.unwrap_err();
        assert_eq!(err, CoachError::EmptyTemplate);
    }

    #[tokio::test]
    async fn stop_deactivates_inputs_and_logs_once() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Voice, 2)).await.unwrap();
        assert!(seq.arbiter().voice().is_started());

        seq.stop().await;
        seq.stop().await;

        assert!(!seq.state().active);
        assert!(seq.state().finished);
        assert!(!seq.arbiter().voice().is_started());
        assert_eq!(h.speech.stop_count(), 1);
        let stops = h
            .kinds()
            .await
            .into_iter()
            .filter(|k| *k == EventKind::Stop)
            .count();
        assert_eq!(stops, 1);
        assert_eq!(h.tts.modes().last(), Some(&AudioMode::Playback));

        seq.advance().await;
        assert_eq!(seq.state().position(), Position::START);
    }

    #[tokio::test]
    async fn switching_voice_to_motion_never_starts_tap() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Voice, 2)).await.unwrap();
        seq.start(config(InputMode::Motion, 2)).await.unwrap();

        assert!(!seq.arbiter().tap().is_started());
        assert!(!seq.arbiter().voice().is_started());
        assert!(seq.arbiter().motion().is_started());
        assert_eq!(h.speech.stop_count(), 1);

        let accel_subscriptions = h
            .sensors
            .calls()
            .into_iter()
            .filter(|c| matches!(c, SensorCall::Subscribe(SensorKind::Accelerometer, _)))
            .count();
        assert_eq!(accel_subscriptions, 1);
    }

    #[tokio::test]
    async fn failing_narration_and_haptics_do_not_stall() {
        let h = Harness::with_tts(RecordingTts::failing());
        let haptics = Arc::new(CountingHaptics {
            fail: true,
            ..CountingHaptics::default()
        });
        let mut seq = h.sequencer_with(default_template(), haptics.clone());
        seq.start(config(InputMode::Manual, 1)).await.unwrap();
        for _ in 0..6 {
            seq.advance().await;
        }
        assert!(seq.state().finished);
        assert!(haptics.count() > 6);
    }

    #[tokio::test]
    async fn tap_burst_advances_and_logs_gesture_first() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Manual, 2)).await.unwrap();

        assert!(!seq.handle_input(spike(0), false).await);
        assert!(!seq.handle_input(spike(100), false).await);
        assert!(seq.handle_input(spike(200), false).await);

        assert_eq!(seq.state().current_step_index, 1);
        let kinds = h.kinds().await;
        assert_eq!(&kinds[kinds.len() - 2..], &[EventKind::TapAdvance, EventKind::NextStep]);
    }

    #[tokio::test]
    async fn suppressed_inputs_update_detectors_without_advancing() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Manual, 2)).await.unwrap();

        for t in [0, 100, 200] {
            assert!(!seq.handle_input(spike(t), true).await);
        }
        assert_eq!(seq.state().position(), Position::START);

        // The burst was consumed while suppressed; a fresh one is needed.
        assert!(!seq.handle_input(spike(300), false).await);
    }

    #[tokio::test]
    async fn voice_next_and_repeat() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Voice, 2)).await.unwrap();

        let speech = InputEvent::Speech;
        assert!(
            seq.handle_input(speech(SpeechEvent::Partial("next".into())), false)
                .await
        );
        // Same utterance completing: no second advance.
        assert!(
            !seq.handle_input(speech(SpeechEvent::Final("next".into())), false)
                .await
        );
        assert_eq!(seq.state().current_step_index, 1);

        assert!(
            seq.handle_input(speech(SpeechEvent::Final("repeat".into())), false)
                .await
        );
        assert_eq!(seq.state().current_step_index, 1);
        assert_eq!(h.kinds().await.last(), Some(&EventKind::RepeatStep));
    }

    #[tokio::test]
    async fn voice_restart_opens_a_fresh_session_in_the_new_language() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Voice, 2)).await.unwrap();

        // Utterance still in progress when the session restarts.
        let next = || InputEvent::Speech(SpeechEvent::Partial("next".into()));
        assert!(seq.handle_input(next(), false).await);

        let mut french = config(InputMode::Voice, 2);
        french.language = "fr-FR".into();
        seq.start(french).await.unwrap();

        assert_eq!(
            *h.speech.starts.lock().unwrap(),
            vec!["en-US".to_string(), "fr-FR".to_string()]
        );
        assert_eq!(h.speech.stop_count(), 1);
        assert_eq!(seq.state().position(), Position::START);

        assert!(seq.handle_input(next(), false).await);
        assert_eq!(seq.state().current_step_index, 1);
    }

    #[tokio::test]
    async fn manual_restart_discards_leftover_spikes() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Manual, 2)).await.unwrap();
        assert!(!seq.handle_input(spike(0), false).await);
        assert!(!seq.handle_input(spike(100), false).await);

        seq.start(config(InputMode::Manual, 2)).await.unwrap();

        assert!(!seq.handle_input(spike(200), false).await);
        assert_eq!(seq.state().position(), Position::START);
        assert!(!seq.handle_input(spike(300), false).await);
        assert!(seq.handle_input(spike(400), false).await);
        assert_eq!(seq.state().current_step_index, 1);
    }

    #[tokio::test]
    async fn pending_stop_drops_gestures_before_the_command_lands() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        seq.start(config(InputMode::Manual, 2)).await.unwrap();

        seq.stop_signal().raise();
        for t in [0, 100, 200] {
            assert!(!seq.handle_input(spike(t), false).await);
        }

        assert_eq!(seq.state().position(), Position::START);
        let kinds = h.kinds().await;
        assert!(!kinds.contains(&EventKind::TapAdvance));
        assert!(!kinds.contains(&EventKind::NextStep));

        seq.stop().await;
        assert!(seq.state().finished);
        assert_eq!(h.kinds().await.last(), Some(&EventKind::Stop));
    }

    #[tokio::test]
    async fn manual_two_rakat_scenario() {
        let h = Harness::new();
        let mut seq = h.sequencer();
        let mut cfg = config(InputMode::Manual, 2);
        cfg.sacred_language = None;
        seq.start(cfg).await.unwrap();

        let mut t = 0;
        for _ in 0..12 {
            for _ in 0..3 {
                seq.handle_input(spike(t), false).await;
                t += 100;
            }
            t += 1000;
        }

        assert!(seq.state().finished);
        let kinds = h.kinds().await;
        let count = |k: EventKind| kinds.iter().filter(|x| **x == k).count();
        assert_eq!(count(EventKind::TapAdvance), 12);
        assert_eq!(count(EventKind::NextStep), 11);
        assert_eq!(count(EventKind::FinalizationStep), 3);
        assert_eq!(kinds.last(), Some(&EventKind::Stop));
        assert!(!seq.arbiter().tap().is_started());
        assert!(h
            .sensors
            .calls()
            .contains(&SensorCall::Unsubscribe(SensorKind::Accelerometer)));
    }

    /// Raises the sequencer's stop signal on the n-th pulse.
    #[derive(Default)]
    struct StopOnPulse {
        signal: std::sync::Mutex<Option<StopSignal>>,
        at: usize,
        pulses: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl HapticFeedback for StopOnPulse {
        async fn trigger(&self) -> Result<(), HapticError> {
            let n = self
                .pulses
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
                + 1;
            if n == self.at {
                if let Some(signal) = self.signal.lock().unwrap().as_ref() {
                    signal.raise();
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn stop_interrupts_closing_sequence() {
        let h = Harness::new();
        // 1 start + 5 steps + first closing step
        let haptics = Arc::new(StopOnPulse {
            at: 7,
            ..StopOnPulse::default()
        });
        let mut seq = h.sequencer_with(default_template(), haptics.clone());
        *haptics.signal.lock().unwrap() = Some(seq.stop_signal());

        seq.start(config(InputMode::Manual, 1)).await.unwrap();
        for _ in 0..6 {
            seq.advance().await;
        }

        assert!(!seq.state().finished);
        assert!(seq.state().active);
        let spoken = h.tts.spoken();
        assert!(spoken.contains(&CLOSING_STEPS[0].narration.to_string()));
        assert!(!spoken.contains(&CLOSING_STEPS[1].narration.to_string()));

        seq.stop().await;
        let kinds = h.kinds().await;
        let closing = kinds
            .iter()
            .filter(|k| **k == EventKind::FinalizationStep)
            .count();
        assert_eq!(closing, 1);
        assert_eq!(kinds.last(), Some(&EventKind::Stop));
        assert!(!seq.state().active);
        assert!(seq.state().finished);
    }
}
