//! Sensor subscription interface.
//!
//! A [`SensorSource`] is the platform side of the accelerometer / gyroscope.
//! Detectors call [`subscribe`](SensorSource::subscribe) on start and
//! [`unsubscribe`](SensorSource::unsubscribe) on stop; the samples
//! themselves are delivered to the coach's event loop as `CoachEvent`s.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// SensorKind / SensorError
// ---------------------------------------------------------------------------

/// Physical sensor stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
}

/// Why a sensor subscription could not be established.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SensorError {
    #[error("{0:?} is not available on this device")]
    Unavailable(SensorKind),

    #[error("permission to read {0:?} was denied")]
    PermissionDenied(SensorKind),
}

// ---------------------------------------------------------------------------
// SensorSource trait
// ---------------------------------------------------------------------------

/// Platform sensor subscriptions.
pub trait SensorSource: Send + Sync {
    /// Begin delivering `kind` samples roughly every `interval`.
    fn subscribe(&self, kind: SensorKind, interval: Duration) -> Result<(), SensorError>;

    /// Stop delivering `kind` samples.  Unsubscribing an idle stream is a no-op.
    fn unsubscribe(&self, kind: SensorKind);
}

// Compile-time assertion: Box<dyn SensorSource> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SensorSource>) {}
};

/// A source that accepts every subscription and never produces samples on
/// its own.  Used when samples are injected directly into the event loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassiveSensorSource;

impl SensorSource for PassiveSensorSource {
    fn subscribe(&self, kind: SensorKind, interval: Duration) -> Result<(), SensorError> {
        log::debug!("sensors: subscribe {kind:?} every {interval:?}");
        Ok(())
    }

    fn unsubscribe(&self, kind: SensorKind) {
        log::debug!("sensors: unsubscribe {kind:?}");
    }
}

// ---------------------------------------------------------------------------
// RecordingSensorSource (tests)
// ---------------------------------------------------------------------------

/// Call made against a [`RecordingSensorSource`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum SensorCall {
    Subscribe(SensorKind, Duration),
    Unsubscribe(SensorKind),
}

/// Test double that records every call and can refuse chosen sensors.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSensorSource {
    pub calls: std::sync::Mutex<Vec<SensorCall>>,
    pub unavailable: Vec<SensorKind>,
}

#[cfg(test)]
impl RecordingSensorSource {
    pub fn without(kind: SensorKind) -> Self {
        Self {
            calls: Default::default(),
            unavailable: vec![kind],
        }
    }

    pub fn calls(&self) -> Vec<SensorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &SensorCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

#[cfg(test)]
impl SensorSource for RecordingSensorSource {
    fn subscribe(&self, kind: SensorKind, interval: Duration) -> Result<(), SensorError> {
        if self.unavailable.contains(&kind) {
            return Err(SensorError::Unavailable(kind));
        }
        self.calls
            .lock()
            .unwrap()
            .push(SensorCall::Subscribe(kind, interval));
        Ok(())
    }

    fn unsubscribe(&self, kind: SensorKind) {
        self.calls.lock().unwrap().push(SensorCall::Unsubscribe(kind));
    }
}
