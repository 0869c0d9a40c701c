//! Error/diagnostic recorder used by the input detectors.
//!
//! Detectors never raise past their own boundary; internal failures are
//! handed to an [`ErrorRecorder`] together with a short context label and
//! otherwise swallowed.

use std::fmt::Display;

/// Sink for non-fatal detector failures.  Must never panic or block.
pub trait ErrorRecorder: Send + Sync {
    fn record(&self, error: &dyn Display, context: &str);
}

/// Default recorder: writes to the `log` facade at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecorder;

impl ErrorRecorder for LogRecorder {
    fn record(&self, error: &dyn Display, context: &str) {
        log::error!("{context}: {error}");
    }
}

// Compile-time assertion: Box<dyn ErrorRecorder> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn ErrorRecorder>) {}
};

/// Recorder that keeps every `(context, message)` pair (tests only).
#[cfg(test)]
#[derive(Default)]
pub struct MemoryRecorder {
    pub entries: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl ErrorRecorder for MemoryRecorder {
    fn record(&self, error: &dyn Display, context: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((context.to_string(), error.to_string()));
    }
}
