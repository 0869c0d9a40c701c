//! Tap-burst gesture detector.
//!
//! [`TapSpikeDetector`] turns a raw accelerometer stream into discrete
//! "gesture detected" events.  A *spike* is any sample whose magnitude
//! deviates from 1 g by at least `threshold_g`.  Spike timestamps are kept
//! in a sliding window; when `min_spikes` of them fall inside `window_ms`
//! a [`TapDetected`] is emitted and the window is cleared.
//!
//! A single jolt never reaches `min_spikes`, and slow drift never exceeds
//! the threshold, so only a deliberate burst of knocks triggers.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::config::TapConfig;
use crate::diagnostics::ErrorRecorder;

use super::sample::AccelSample;
use super::source::{SensorKind, SensorSource};

/// Emitted when a burst of spikes completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapDetected {
    /// Timestamp of the spike that completed the burst.
    pub timestamp_ms: u64,
    /// Number of spikes in the burst.
    pub spikes: usize,
}

pub struct TapSpikeDetector {
    config: TapConfig,
    source: Arc<dyn SensorSource>,
    recorder: Arc<dyn ErrorRecorder>,
    spikes: VecDeque<u64>,
    started: bool,
    error: Option<String>,
}

impl TapSpikeDetector {
    pub fn new(
        config: TapConfig,
        source: Arc<dyn SensorSource>,
        recorder: Arc<dyn ErrorRecorder>,
    ) -> Self {
        Self {
            spikes: VecDeque::with_capacity(config.min_spikes.max(1)),
            config,
            source,
            recorder,
            started: false,
            error: None,
        }
    }

    /// Subscribe to the accelerometer.  No-op when already started.
    ///
    /// A refused subscription leaves the detector stopped with
    /// [`error`](Self::error) set.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        let interval = Duration::from_millis(self.config.sample_interval_ms);
        match self.source.subscribe(SensorKind::Accelerometer, interval) {
            Ok(()) => {
                self.started = true;
                self.error = None;
                self.spikes.clear();
                log::debug!("tap: started");
            }
            Err(e) => {
                self.recorder.record(&e, "tap.start");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Unsubscribe and forget pending spikes.  No-op when not started.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.source.unsubscribe(SensorKind::Accelerometer);
        self.started = false;
        self.spikes.clear();
        log::debug!("tap: stopped");
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Last start failure, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Feed one sample.  Ignored unless the detector is started.
    pub fn process(&mut self, sample: &AccelSample) -> Option<TapDetected> {
        if !self.started {
            return None;
        }

        let now = sample.timestamp_ms;
        let window = self.config.window_ms;
        while let Some(&oldest) = self.spikes.front() {
            if now.saturating_sub(oldest) > window {
                self.spikes.pop_front();
            } else {
                break;
            }
        }

        if (sample.magnitude() - 1.0).abs() >= self.config.threshold_g {
            self.spikes.push_back(now);
        }

        if self.spikes.len() >= self.config.min_spikes {
            let spikes = self.spikes.len();
            self.spikes.clear();
            log::debug!("tap: burst of {spikes} spikes at {now} ms");
            return Some(TapDetected {
                timestamp_ms: now,
                spikes,
            });
        }

        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
