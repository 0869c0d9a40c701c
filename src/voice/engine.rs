//! Speech-recognition engine interface.
//!
//! [`SpeechRecognizer`] is the platform speech-to-text session: start it in a
//! language, stop it.  Transcripts and state changes come back
//! asynchronously as [`SpeechEvent`]s through the coach's event channel.
//!
//! `MockRecognizer` (available under `#[cfg(test)]`) counts calls and can
//! be told to refuse `start_session`.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// RecognizerError
// ---------------------------------------------------------------------------

/// Errors surfaced by a speech-recognition session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecognizerError {
    /// The user refused microphone / speech permission.
    #[error("speech recognition permission denied")]
    PermissionDenied,

    /// No recognizer exists for the requested language or on this device.
    #[error("speech recognition unavailable: {0}")]
    Unavailable(String),

    /// The engine failed while running.
    #[error("speech recognition failed: {0}")]
    Engine(String),
}

// ---------------------------------------------------------------------------
// SpeechEvent
// ---------------------------------------------------------------------------

/// Callback from a running recognition session.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    /// The engine started or stopped listening.
    Listening(bool),
    /// In-progress transcript of the current utterance.
    Partial(String),
    /// Committed transcript; ends the current utterance.
    Final(String),
    /// Recognition error reported by the engine.
    Error(String),
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe speech-to-text session control.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Begin a continuous session in `language` (BCP-47 tag).
    async fn start_session(&self, language: &str) -> Result<(), RecognizerError>;

    /// End the current session.
    async fn stop_session(&self) -> Result<(), RecognizerError>;
}

// Compile-time assertion: Box<dyn SpeechRecognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechRecognizer>) {}
};

/// Recognizer whose sessions always succeed.  Transcripts are expected to be
/// injected directly as [`SpeechEvent`]s (console demo, integration hosts).
#[derive(Debug, Default, Clone, Copy)]
pub struct PassiveRecognizer;

#[async_trait]
impl SpeechRecognizer for PassiveRecognizer {
    async fn start_session(&self, language: &str) -> Result<(), RecognizerError> {
        log::debug!("voice: passive session started ({language})");
        Ok(())
    }

    async fn stop_session(&self) -> Result<(), RecognizerError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockRecognizer (test only)
// ---------------------------------------------------------------------------

#[cfg(test)]
#[derive(Default)]
pub struct MockRecognizer {
    pub starts: std::sync::Mutex<Vec<String>>,
    pub stops: std::sync::atomic::AtomicUsize,
    pub refuse: Option<RecognizerError>,
}

#[cfg(test)]
impl MockRecognizer {
    pub fn refusing(err: RecognizerError) -> Self {
        Self {
            refuse: Some(err),
            ..Self::default()
        }
    }

    pub fn start_count(&self) -> usize {
        self.starts.lock().unwrap().len()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn start_session(&self, language: &str) -> Result<(), RecognizerError> {
        if let Some(err) = &self.refuse {
            return Err(err.clone());
        }
        self.starts.lock().unwrap().push(language.to_string());
        Ok(())
    }

    async fn stop_session(&self) -> Result<(), RecognizerError> {
        self.stops.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
