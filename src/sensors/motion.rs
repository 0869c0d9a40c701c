//! Heuristic body-pose classifier.
//!
//! [`MotionPoseClassifier`] combines the latest accelerometer and gyroscope
//! samples into [`MotionFeatures`] and runs them through an ordered table of
//! [`PoseRule`]s; the first rule whose predicate matches decides the pose.
//!
//! ## Default rule table
//!
//! | # | Pose      | Confidence | Condition                                  |
//! |---|-----------|------------|--------------------------------------------|
//! | 1 | standing  | 0.40       | motion < 0.20 and deviation < 0.12         |
//! | 2 | bowing    | 0.35       | motion < 0.35 and 0.12 ≤ deviation < 0.35  |
//! | 3 | prostrate | 0.30       | deviation ≥ 0.35 and motion < 0.25         |
//! | 4 | sitting   | 0.20       | motion < 0.15 and deviation < 0.15         |
//! | – | none      | 0.00       | no rule matched                            |
//!
//! `deviation = | |accel| − 1 g |`, `motion = |rotation rate|`.
//!
//! The estimate is deliberately coarse.  A phone held still in the sitting
//! position has the same signature as standing, and rule 4 is shadowed by
//! rules 1 and 2 for every input; the table is kept as tuned.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::MotionConfig;
use crate::diagnostics::ErrorRecorder;
use crate::ritual::Posture;

use super::sample::{magnitude, AccelSample, RotationSample};
use super::source::{SensorKind, SensorSource};

// ---------------------------------------------------------------------------
// Features and rules
// ---------------------------------------------------------------------------

/// Scalar features the rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionFeatures {
    /// `|accel|` in g.
    pub gravity_magnitude: f32,
    /// `|gravity_magnitude − 1.0|`.
    pub gravity_deviation: f32,
    /// `|rotation rate|` in rad/s.
    pub motion: f32,
}

impl MotionFeatures {
    pub fn from_vectors(accel: [f32; 3], rotation: [f32; 3]) -> Self {
        let gravity_magnitude = magnitude(accel);
        Self {
            gravity_magnitude,
            gravity_deviation: (gravity_magnitude - 1.0).abs(),
            motion: magnitude(rotation),
        }
    }
}

/// One row of the classification table.
#[derive(Clone, Copy)]
pub struct PoseRule {
    pub pose: Posture,
    pub confidence: f32,
    pub matches: fn(&MotionFeatures) -> bool,
}

impl std::fmt::Debug for PoseRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseRule")
            .field("pose", &self.pose)
            .field("confidence", &self.confidence)
            .finish_non_exhaustive()
    }
}

pub static DEFAULT_RULES: [PoseRule; 4] = [
    PoseRule {
        pose: Posture::Standing,
        confidence: 0.40,
        matches: |f| f.motion < 0.20 && f.gravity_deviation < 0.12,
    },
    PoseRule {
        pose: Posture::Bowing,
        confidence: 0.35,
        matches: |f| {
            f.motion < 0.35 && f.gravity_deviation >= 0.12 && f.gravity_deviation < 0.35
        },
    },
    PoseRule {
        pose: Posture::Prostrate,
        confidence: 0.30,
        matches: |f| f.gravity_deviation >= 0.35 && f.motion < 0.25,
    },
    PoseRule {
        pose: Posture::Sitting,
        confidence: 0.20,
        matches: |f| f.motion < 0.15 && f.gravity_deviation < 0.15,
    },
];

/// Evaluate `rules` top-to-bottom; first match wins.
pub fn classify(features: &MotionFeatures, rules: &[PoseRule]) -> (Option<Posture>, f32) {
    rules
        .iter()
        .find(|rule| (rule.matches)(features))
        .map(|rule| (Some(rule.pose), rule.confidence))
        .unwrap_or((None, 0.0))
}

// ---------------------------------------------------------------------------
// MotionPoseReading
// ---------------------------------------------------------------------------

/// Latest pose estimate.  Superseded by every new sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionPoseReading {
    pub pose: Option<Posture>,
    /// In `[0, 1]`.
    pub confidence: f32,
    pub timestamp_ms: u64,
}

// ---------------------------------------------------------------------------
// MotionPoseClassifier
// ---------------------------------------------------------------------------

pub struct MotionPoseClassifier {
    config: MotionConfig,
    rules: Vec<PoseRule>,
    source: Arc<dyn SensorSource>,
    recorder: Arc<dyn ErrorRecorder>,
    last_accel: Option<[f32; 3]>,
    last_rotation: Option<[f32; 3]>,
    reading: Option<MotionPoseReading>,
    started: bool,
    error: Option<String>,
}

impl MotionPoseClassifier {
    /// Classifier using [`DEFAULT_RULES`].
    pub fn new(
        config: MotionConfig,
        source: Arc<dyn SensorSource>,
        recorder: Arc<dyn ErrorRecorder>,
    ) -> Self {
        Self::with_rules(config, DEFAULT_RULES.to_vec(), source, recorder)
    }

    pub fn with_rules(
        config: MotionConfig,
        rules: Vec<PoseRule>,
        source: Arc<dyn SensorSource>,
        recorder: Arc<dyn ErrorRecorder>,
    ) -> Self {
        Self {
            config,
            rules,
            source,
            recorder,
            last_accel: None,
            last_rotation: None,
            reading: None,
            started: false,
            error: None,
        }
    }

    /// Subscribe to both sensors.  No-op when already started.
    ///
    /// If either subscription is refused the other is released again and the
    /// classifier stays stopped with [`error`](Self::error) set.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        let interval = Duration::from_millis(self.config.sample_interval_ms);

        if let Err(e) = self.source.subscribe(SensorKind::Accelerometer, interval) {
            self.fail(&e);
            return;
        }
        if let Err(e) = self.source.subscribe(SensorKind::Gyroscope, interval) {
            self.source.unsubscribe(SensorKind::Accelerometer);
            self.fail(&e);
            return;
        }

        self.started = true;
        self.error = None;
        self.clear_samples();
        log::debug!("motion: started");
    }

    /// Release both subscriptions.  No-op when not started.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.source.unsubscribe(SensorKind::Accelerometer);
        self.source.unsubscribe(SensorKind::Gyroscope);
        self.started = false;
        self.clear_samples();
        log::debug!("motion: stopped");
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The most recent reading, if any sample has been classified.
    pub fn latest(&self) -> Option<MotionPoseReading> {
        self.reading
    }

    /// Feed an accelerometer sample and reclassify.
    pub fn on_acceleration(&mut self, sample: &AccelSample) -> Option<MotionPoseReading> {
        if !self.started {
            return None;
        }
        self.last_accel = Some(sample.accel);
        self.reclassify(sample.timestamp_ms)
    }

    /// Feed a gyroscope sample and reclassify with the latest acceleration.
    pub fn on_rotation(&mut self, sample: &RotationSample) -> Option<MotionPoseReading> {
        if !self.started {
            return None;
        }
        self.last_rotation = Some(sample.rate);
        self.reclassify(sample.timestamp_ms)
    }

    fn reclassify(&mut self, timestamp_ms: u64) -> Option<MotionPoseReading> {
        // Rotation defaults to rest until the gyroscope reports.
        let accel = self.last_accel?;
        let rotation = self.last_rotation.unwrap_or([0.0; 3]);

        let features = MotionFeatures::from_vectors(accel, rotation);
        let (pose, confidence) = classify(&features, &self.rules);
        let reading = MotionPoseReading {
            pose,
            confidence,
            timestamp_ms,
        };
        self.reading = Some(reading);
        Some(reading)
    }

    fn clear_samples(&mut self) {
        self.last_accel = None;
        self.last_rotation = None;
        self.reading = None;
    }

    fn fail(&mut self, e: &super::source::SensorError) {
        self.recorder.record(e, "motion.start");
        self.error = Some(e.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
