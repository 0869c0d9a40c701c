//! Input arbitration.
//!
//! [`InputArbiter`] owns the three detectors and guarantees that at most one
//! of them is started at a time.  Raw inputs are routed to the active
//! detector only; whatever it recognises comes back as [`InputSignal`]s for
//! the sequencer to act on.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::{AppConfig, CoachConfiguration, InputMode, MotionConfig};
use crate::diagnostics::ErrorRecorder;
use crate::eventlog::EventKind;
use crate::narration::{AudioMode, SpeechNarrator};
use crate::ritual::Posture;
use crate::sensors::{
    AccelSample, MotionPoseClassifier, MotionPoseReading, RotationSample, SensorSource,
    TapSpikeDetector,
};
use crate::voice::{SpeechEvent, SpeechRecognizer, VoiceCommand, VoiceCommandRecognizer};

use super::state::InputStatus;

/// Raw input delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Acceleration(AccelSample),
    Rotation(RotationSample),
    Speech(SpeechEvent),
}

/// What the active detector recognised.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSignal {
    /// Move forward; logged as `kind` before the advance.
    Advance { kind: EventKind, payload: Value },
    /// Re-narrate the current step.
    Repeat { payload: Value },
    /// Throttled pose reading worth persisting.
    PoseReading { payload: Value },
}

pub struct InputArbiter {
    tap: TapSpikeDetector,
    voice: VoiceCommandRecognizer,
    motion: MotionPoseClassifier,
    motion_config: MotionConfig,
    active: Option<InputMode>,
    auto_advance: bool,
    last_pose_log_ms: Option<u64>,
}

impl InputArbiter {
    pub fn new(
        tap: TapSpikeDetector,
        voice: VoiceCommandRecognizer,
        motion: MotionPoseClassifier,
        motion_config: MotionConfig,
    ) -> Self {
        Self {
            tap,
            voice,
            motion,
            motion_config,
            active: None,
            auto_advance: false,
            last_pose_log_ms: None,
        }
    }

    /// Build all three detectors from the application config.
    pub fn from_config(
        config: &AppConfig,
        sensors: Arc<dyn SensorSource>,
        speech: Arc<dyn SpeechRecognizer>,
        recorder: Arc<dyn ErrorRecorder>,
    ) -> Self {
        Self::new(
            TapSpikeDetector::new(config.tap.clone(), Arc::clone(&sensors), Arc::clone(&recorder)),
            VoiceCommandRecognizer::new(speech, Arc::clone(&recorder)),
            MotionPoseClassifier::new(config.motion.clone(), sensors, recorder),
            config.motion.clone(),
        )
    }

    /// Stop every detector, route audio for `mode`, then start its detector.
    ///
    /// The target is restarted too when it is already running, so each
    /// activation begins with empty spike windows, transcripts and pose
    /// samples, and a recognizer session in `config.language`.
    ///
    /// Voice needs the record-and-playback session; the other modes use
    /// plain playback.  Start failures stay inside the detector (see its
    /// `error()`).
    pub async fn activate(
        &mut self,
        mode: InputMode,
        config: &CoachConfiguration,
        narrator: &SpeechNarrator,
    ) {
        self.tap.stop();
        self.voice.stop().await;
        self.motion.stop();

        let routing = match mode {
            InputMode::Voice => AudioMode::RecordAndPlayback,
            InputMode::Manual | InputMode::Motion => AudioMode::Playback,
        };
        narrator.set_audio_mode(routing).await;

        match mode {
            InputMode::Manual => self.tap.start(),
            InputMode::Voice => self.voice.start(&config.language).await,
            InputMode::Motion => self.motion.start(),
        }

        self.active = Some(mode);
        self.auto_advance = config.auto_advance_from_pose;
        self.last_pose_log_ms = None;
        log::info!("arbiter: {} input active", mode.as_str());
    }

    /// Stop all three detectors.
    pub async fn deactivate_all(&mut self) {
        self.tap.stop();
        self.voice.stop().await;
        self.motion.stop();
        if self.active.take().is_some() {
            log::info!("arbiter: all inputs stopped");
        }
    }

    pub fn active_mode(&self) -> Option<InputMode> {
        self.active
    }

    /// Route one raw input to the active detector.
    ///
    /// `expected` is the posture of the current step; a confident reading
    /// matching it becomes an auto-advance when enabled.
    pub fn handle(&mut self, input: InputEvent, expected: Option<Posture>) -> Vec<InputSignal> {
        match (self.active, input) {
            (Some(InputMode::Manual), InputEvent::Acceleration(sample)) => self
                .tap
                .process(&sample)
                .map(|hit| InputSignal::Advance {
                    kind: EventKind::TapAdvance,
                    payload: json!({ "timestamp_ms": hit.timestamp_ms, "spikes": hit.spikes }),
                })
                .into_iter()
                .collect(),

            (Some(InputMode::Voice), InputEvent::Speech(event)) => self
                .voice
                .handle(event)
                .map(|command| {
                    let payload = json!({ "command": command.as_str() });
                    match command {
                        VoiceCommand::Next => InputSignal::Advance {
                            kind: EventKind::VoiceCommand,
                            payload,
                        },
                        VoiceCommand::Repeat => InputSignal::Repeat { payload },
                    }
                })
                .into_iter()
                .collect(),

            (Some(InputMode::Motion), InputEvent::Acceleration(sample)) => {
                match self.motion.on_acceleration(&sample) {
                    Some(reading) => self.on_pose(reading, expected),
                    None => Vec::new(),
                }
            }
            (Some(InputMode::Motion), InputEvent::Rotation(sample)) => {
                match self.motion.on_rotation(&sample) {
                    Some(reading) => self.on_pose(reading, expected),
                    None => Vec::new(),
                }
            }

            _ => Vec::new(),
        }
    }

    fn on_pose(
        &mut self,
        reading: MotionPoseReading,
        expected: Option<Posture>,
    ) -> Vec<InputSignal> {
        let mut signals = Vec::new();
        let payload = json!({
            "pose": reading.pose,
            "confidence": reading.confidence,
            "timestamp_ms": reading.timestamp_ms,
        });

        let due = match self.last_pose_log_ms {
            None => true,
            Some(last) => {
                reading.timestamp_ms.saturating_sub(last) >= self.motion_config.pose_log_interval_ms
            }
        };
        if due {
            self.last_pose_log_ms = Some(reading.timestamp_ms);
            signals.push(InputSignal::PoseReading {
                payload: payload.clone(),
            });
        }

        if self.auto_advance
            && reading.pose.is_some()
            && reading.pose == expected
            && reading.confidence >= self.motion_config.advance_confidence
        {
            signals.push(InputSignal::Advance {
                kind: EventKind::AutoPoseAdvance,
                payload,
            });
        }

        signals
    }

    /// Detector state for the UI.
    pub fn status(&self) -> InputStatus {
        InputStatus {
            mode: self.active,
            voice_listening: self.voice.is_listening(),
            voice_partial: self.voice.partial().to_string(),
            voice_error: self.voice.error().map(str::to_string),
            tap_error: self.tap.error().map(str::to_string),
            motion_error: self.motion.error().map(str::to_string),
            pose: self.motion.latest(),
        }
    }

    pub fn tap(&self) -> &TapSpikeDetector {
        &self.tap
    }

    pub fn voice(&self) -> &VoiceCommandRecognizer {
        &self.voice
    }

    pub fn motion(&self) -> &MotionPoseClassifier {
        &self.motion
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemoryRecorder;
    use crate::narration::{RecordingTts, TtsCall};
    use crate::sensors::{PoseRule, RecordingSensorSource, SensorCall, SensorKind};
    use crate::voice::MockRecognizer;

    struct Fixture {
        sensors: Arc<RecordingSensorSource>,
        speech: Arc<MockRecognizer>,
        tts: Arc<RecordingTts>,
        narrator: SpeechNarrator,
    }

    impl Fixture {
        fn new() -> Self {
            let tts = Arc::new(RecordingTts::default());
            Self {
                sensors: Arc::new(RecordingSensorSource::default()),
                speech: Arc::new(MockRecognizer::default()),
                narrator: SpeechNarrator::new(tts.clone()),
                tts,
            }
        }

        fn arbiter(&self) -> InputArbiter {
            InputArbiter::from_config(
                &AppConfig::default(),
                self.sensors.clone(),
                self.speech.clone(),
                Arc::new(MemoryRecorder::default()),
            )
        }

        /// Arbiter whose motion classifier reports `Standing` at full
        /// confidence for any sample.
        fn confident_arbiter(&self) -> InputArbiter {
            let config = AppConfig::default();
            let rules = vec![PoseRule {
                pose: Posture::Standing,
                confidence: 0.9,
                matches: |_| true,
            }];
            let recorder: Arc<dyn ErrorRecorder> = Arc::new(MemoryRecorder::default());
            InputArbiter::new(
                TapSpikeDetector::new(config.tap.clone(), self.sensors.clone(), recorder.clone()),
                VoiceCommandRecognizer::new(self.speech.clone(), recorder.clone()),
                MotionPoseClassifier::with_rules(
                    config.motion.clone(),
                    rules,
                    self.sensors.clone(),
                    recorder,
                ),
                config.motion,
            )
        }
    }

    fn coach(mode: InputMode) -> CoachConfiguration {
        CoachConfiguration {
            mode,
            ..CoachConfiguration::default()
        }
    }

    fn spike(t: u64) -> InputEvent {
        InputEvent::Acceleration(AccelSample::new(t, [0.0, 0.0, 3.5]))
    }

    #[tokio::test]
    async fn manual_mode_starts_tap_only() {
        let f = Fixture::new();
        let mut arb = f.arbiter();
        arb.activate(InputMode::Manual, &coach(InputMode::Manual), &f.narrator)
            .await;

        assert!(arb.tap().is_started());
        assert!(!arb.voice().is_started());
        assert!(!arb.motion().is_started());
        assert_eq!(f.speech.start_count(), 0);
        assert_eq!(f.tts.modes(), vec![AudioMode::Playback]);
    }

    #[tokio::test]
    async fn voice_then_motion_switches_cleanly() {
        let f = Fixture::new();
        let mut arb = f.arbiter();

        arb.activate(InputMode::Voice, &coach(InputMode::Voice), &f.narrator)
            .await;
        assert!(arb.voice().is_started());
        assert_eq!(f.speech.start_count(), 1);

        arb.activate(InputMode::Motion, &coach(InputMode::Motion), &f.narrator)
            .await;

        assert!(!arb.voice().is_started());
        assert_eq!(f.speech.stop_count(), 1);
        assert!(arb.motion().is_started());
        assert!(!arb.tap().is_started());

        let interval = std::time::Duration::from_millis(100);
        assert_eq!(
            f.sensors
                .count(&SensorCall::Subscribe(SensorKind::Accelerometer, interval)),
            1
        );
        assert_eq!(
            f.sensors
                .count(&SensorCall::Subscribe(SensorKind::Gyroscope, interval)),
            1
        );
        assert_eq!(
            f.tts.modes(),
            vec![AudioMode::RecordAndPlayback, AudioMode::Playback]
        );
    }

    #[tokio::test]
    async fn deactivate_all_stops_everything() {
        let f = Fixture::new();
        let mut arb = f.arbiter();
        arb.activate(InputMode::Motion, &coach(InputMode::Motion), &f.narrator)
            .await;
        arb.deactivate_all().await;

        assert!(arb.active_mode().is_none());
        assert!(!arb.motion().is_started());
        assert!(f
            .sensors
            .calls()
            .contains(&SensorCall::Unsubscribe(SensorKind::Gyroscope)));
    }

    #[tokio::test]
    async fn tap_burst_becomes_advance() {
        let f = Fixture::new();
        let mut arb = f.arbiter();
        arb.activate(InputMode::Manual, &coach(InputMode::Manual), &f.narrator)
            .await;

        assert!(arb.handle(spike(0), None).is_empty());
        assert!(arb.handle(spike(100), None).is_empty());
        let signals = arb.handle(spike(200), None);

        assert_eq!(signals.len(), 1);
        assert!(matches!(
            signals[0],
            InputSignal::Advance {
                kind: EventKind::TapAdvance,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn inputs_for_inactive_detectors_are_ignored() {
        let f = Fixture::new();
        let mut arb = f.arbiter();
        arb.activate(InputMode::Voice, &coach(InputMode::Voice), &f.narrator)
            .await;

        for t in [0, 100, 200] {
            assert!(arb.handle(spike(t), None).is_empty());
        }
        let signals = arb.handle(InputEvent::Speech(SpeechEvent::Final("next".into())), None);
        assert!(matches!(
            signals[0],
            InputSignal::Advance {
                kind: EventKind::VoiceCommand,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn repeat_command_maps_to_repeat_signal() {
        let f = Fixture::new();
        let mut arb = f.arbiter();
        arb.activate(InputMode::Voice, &coach(InputMode::Voice), &f.narrator)
            .await;

        let signals = arb.handle(
            InputEvent::Speech(SpeechEvent::Final("please repeat".into())),
            None,
        );
        assert_eq!(
            signals,
            vec![InputSignal::Repeat {
                payload: json!({ "command": "repeat" })
            }]
        );
    }

    #[tokio::test]
    async fn pose_readings_are_throttled() {
        let f = Fixture::new();
        let mut arb = f.arbiter();
        arb.activate(InputMode::Motion, &coach(InputMode::Motion), &f.narrator)
            .await;

        let upright = |t| InputEvent::Acceleration(AccelSample::new(t, [0.0, 0.0, 1.0]));
        let logged: usize = [0u64, 500, 1999, 2000, 3000, 4100]
            .into_iter()
            .map(|t| {
                arb.handle(upright(t), None)
                    .into_iter()
                    .filter(|s| matches!(s, InputSignal::PoseReading { .. }))
                    .count()
            })
            .sum();

        // 0, 2000 and 4100
        assert_eq!(logged, 3);
        assert!(arb.status().pose.is_some());
    }

    #[tokio::test]
    async fn default_rules_never_auto_advance() {
        let f = Fixture::new();
        let mut arb = f.arbiter();
        let mut cfg = coach(InputMode::Motion);
        cfg.auto_advance_from_pose = true;
        arb.activate(InputMode::Motion, &cfg, &f.narrator).await;

        let signals = arb.handle(
            InputEvent::Acceleration(AccelSample::new(0, [0.0, 0.0, 1.0])),
            Some(Posture::Standing),
        );
        assert!(signals
            .iter()
            .all(|s| !matches!(s, InputSignal::Advance { .. })));
    }

    #[tokio::test]
    async fn confident_matching_pose_auto_advances() {
        let f = Fixture::new();
        let mut arb = f.confident_arbiter();
        let mut cfg = coach(InputMode::Motion);
        cfg.auto_advance_from_pose = true;
        arb.activate(InputMode::Motion, &cfg, &f.narrator).await;

        let sample = InputEvent::Acceleration(AccelSample::new(0, [0.0, 0.0, 1.0]));
        let signals = arb.handle(sample.clone(), Some(Posture::Standing));
        assert!(signals.iter().any(|s| matches!(
            s,
            InputSignal::Advance {
                kind: EventKind::AutoPoseAdvance,
                ..
            }
        )));

        // Wrong expected posture: reading only.
        let signals = arb.handle(sample, Some(Posture::Bowing));
        assert!(signals
            .iter()
            .all(|s| !matches!(s, InputSignal::Advance { .. })));
    }

    #[tokio::test]
    async fn auto_advance_disabled_by_config() {
        let f = Fixture::new();
        let mut arb = f.confident_arbiter();
        arb.activate(InputMode::Motion, &coach(InputMode::Motion), &f.narrator)
            .await;

        let signals = arb.handle(
            InputEvent::Acceleration(AccelSample::new(0, [0.0, 0.0, 1.0])),
            Some(Posture::Standing),
        );
        assert_eq!(signals.len(), 1);
        assert!(matches!(signals[0], InputSignal::PoseReading { .. }));
    }

    #[tokio::test]
    async fn refused_microphone_surfaces_in_status() {
        let f = Fixture {
            speech: Arc::new(MockRecognizer::refusing(
                crate::voice::RecognizerError::PermissionDenied,
            )),
            ..Fixture::new()
        };
        let mut arb = f.arbiter();
        arb.activate(InputMode::Voice, &coach(InputMode::Voice), &f.narrator)
            .await;

        assert!(!arb.voice().is_started());
        assert!(arb.status().voice_error.is_some());
        assert_eq!(arb.status().mode, Some(InputMode::Voice));
        assert!(f
            .tts
            .calls()
            .contains(&TtsCall::Mode(AudioMode::RecordAndPlayback)));
    }
}
