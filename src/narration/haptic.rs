//! Haptic feedback interface.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("haptic feedback unavailable: {0}")]
pub struct HapticError(pub String);

/// Fire-and-forget vibration pulse.  Callers ignore failures.
#[async_trait]
pub trait HapticFeedback: Send + Sync {
    async fn trigger(&self) -> Result<(), HapticError>;
}

/// Device without a vibration motor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHaptics;

#[async_trait]
impl HapticFeedback for NoopHaptics {
    async fn trigger(&self) -> Result<(), HapticError> {
        Ok(())
    }
}

/// Counts pulses; optionally fails each one (tests only).
#[cfg(test)]
#[derive(Default)]
pub struct CountingHaptics {
    pub pulses: std::sync::atomic::AtomicUsize,
    pub fail: bool,
}

#[cfg(test)]
impl CountingHaptics {
    pub fn count(&self) -> usize {
        self.pulses.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl HapticFeedback for CountingHaptics {
    async fn trigger(&self) -> Result<(), HapticError> {
        self.pulses.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail {
            return Err(HapticError("no motor".into()));
        }
        Ok(())
    }
}
