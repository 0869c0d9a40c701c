//! Text-to-speech engine interface.
//!
//! [`TtsEngine`] is the platform speech synthesiser.  `speak` resolves when
//! playback finishes (or is cut short); `set_audio_mode` switches the audio
//! session between plain playback and record+playback, which voice mode
//! needs so the microphone stays open while the narrator talks.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::VoiceGender;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TtsError {
    /// No voice is installed for the requested language.
    #[error("no voice available for language {0}")]
    NoVoice(String),

    /// The audio session could not be configured.
    #[error("audio session error: {0}")]
    AudioSession(String),

    /// Synthesis or playback failed.
    #[error("speech playback failed: {0}")]
    Playback(String),
}

// ---------------------------------------------------------------------------
// AudioMode / VoiceOptions
// ---------------------------------------------------------------------------

/// Audio-session routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioMode {
    /// Output only.  Used for manual and motion modes, and after a session.
    #[default]
    Playback,
    /// Simultaneous microphone capture and narration (voice mode).
    RecordAndPlayback,
}

/// Per-utterance voice selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoiceOptions {
    pub gender: Option<VoiceGender>,
}

// ---------------------------------------------------------------------------
// TtsEngine trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Speak `text` in `language`; resolves once playback has ended.
    async fn speak(&self, text: &str, language: &str, voice: VoiceOptions)
        -> Result<(), TtsError>;

    /// Switch the audio-session routing.
    async fn set_audio_mode(&self, mode: AudioMode) -> Result<(), TtsError>;
}

// Compile-time assertion: Box<dyn TtsEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TtsEngine>) {}
};

/// Engine that "speaks" by writing each segment to the log at `info` level.
/// Completes immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTts;

#[async_trait]
impl TtsEngine for LoggingTts {
    async fn speak(
        &self,
        text: &str,
        language: &str,
        _voice: VoiceOptions,
    ) -> Result<(), TtsError> {
        log::info!("[{language}] {text}");
        Ok(())
    }

    async fn set_audio_mode(&self, mode: AudioMode) -> Result<(), TtsError> {
        log::debug!("tts: audio mode {mode:?}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingTts (test only)
// ---------------------------------------------------------------------------

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum TtsCall {
    Speak { text: String, language: String },
    Mode(AudioMode),
}

/// Records every call; optionally fails all of them after recording.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingTts {
    pub calls: std::sync::Mutex<Vec<TtsCall>>,
    pub fail: bool,
}

#[cfg(test)]
impl RecordingTts {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<TtsCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Spoken texts in order.
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TtsCall::Speak { text, .. } => Some(text),
                TtsCall::Mode(_) => None,
            })
            .collect()
    }

    pub fn modes(&self) -> Vec<AudioMode> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TtsCall::Mode(m) => Some(m),
                TtsCall::Speak { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
#[async_trait]
impl TtsEngine for RecordingTts {
    async fn speak(
        &self,
        text: &str,
        language: &str,
        _voice: VoiceOptions,
    ) -> Result<(), TtsError> {
        self.calls.lock().unwrap().push(TtsCall::Speak {
            text: text.to_string(),
            language: language.to_string(),
        });
        if self.fail {
            return Err(TtsError::Playback("engine offline".into()));
        }
        Ok(())
    }

    async fn set_audio_mode(&self, mode: AudioMode) -> Result<(), TtsError> {
        self.calls.lock().unwrap().push(TtsCall::Mode(mode));
        if self.fail {
            return Err(TtsError::AudioSession("engine offline".into()));
        }
        Ok(())
    }
}
