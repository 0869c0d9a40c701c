//! Motion-sensor input: sample types, subscriptions, and the two detectors
//! built on them.
//!
//! # Pipeline
//!
//! ```text
//! SensorSource::subscribe ─▶ platform delivers samples ─▶ CoachEvent (mpsc)
//!                                                          │
//!            ┌─────────────────────────────────────────────┤
//!            ▼                                             ▼
//!   TapSpikeDetector::process                 MotionPoseClassifier::on_*
//!   → Option<TapDetected>                     → Option<MotionPoseReading>
//! ```

pub mod motion;
pub mod sample;
pub mod source;
pub mod tap;

pub use motion::{
    classify, MotionFeatures, MotionPoseClassifier, MotionPoseReading, PoseRule, DEFAULT_RULES,
};
pub use sample::{magnitude, AccelSample, RotationSample};
pub use source::{PassiveSensorSource, SensorError, SensorKind, SensorSource};
pub use tap::{TapDetected, TapSpikeDetector};

#[cfg(test)]
pub use source::{RecordingSensorSource, SensorCall};
