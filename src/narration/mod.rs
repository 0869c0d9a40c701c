//! Narration and haptic side effects.
//!
//! * [`TtsEngine`] — platform text-to-speech, plus [`LoggingTts`].
//! * [`SpeechNarrator`] — sequential, best-effort playback of
//!   [`SpeechSegment`]s and audio routing via [`AudioMode`].
//! * [`HapticFeedback`] — vibration pulse, plus [`NoopHaptics`].

pub mod haptic;
pub mod narrator;
pub mod tts;

pub use haptic::{HapticError, HapticFeedback, NoopHaptics};
pub use narrator::{SpeechNarrator, SpeechSegment};
pub use tts::{AudioMode, LoggingTts, TtsEngine, TtsError, VoiceOptions};

#[cfg(test)]
pub use haptic::CountingHaptics;
#[cfg(test)]
pub use tts::{RecordingTts, TtsCall};
