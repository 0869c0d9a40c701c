//! Best-effort narrator on top of a [`TtsEngine`].
//!
//! [`SpeechNarrator`] never returns an error: a missing or failing engine
//! is logged at `warn` and the call completes as if playback had finished,
//! so the coach keeps moving even without audio.

use std::sync::Arc;

use crate::config::VoiceGender;

use super::tts::{AudioMode, TtsEngine, VoiceOptions};

/// One piece of narration with its own language and voice.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSegment {
    pub text: String,
    pub language: String,
    pub voice_gender: Option<VoiceGender>,
}

impl SpeechSegment {
    pub fn new(
        text: impl Into<String>,
        language: impl Into<String>,
        voice_gender: Option<VoiceGender>,
    ) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            voice_gender,
        }
    }
}

#[derive(Clone)]
pub struct SpeechNarrator {
    engine: Arc<dyn TtsEngine>,
}

impl SpeechNarrator {
    pub fn new(engine: Arc<dyn TtsEngine>) -> Self {
        Self { engine }
    }

    /// Speak one segment to completion.
    pub async fn speak(&self, text: &str, language: &str, voice: VoiceOptions) {
        if text.trim().is_empty() {
            return;
        }
        if let Err(e) = self.engine.speak(text, language, voice).await {
            log::warn!("narration: failed to speak ({language}): {e}");
        }
    }

    /// Speak `segments` strictly in order, each one finishing before the
    /// next begins.  A failing segment does not stop the ones after it.
    pub async fn speak_segments(&self, segments: &[SpeechSegment]) {
        for segment in segments {
            let voice = VoiceOptions {
                gender: segment.voice_gender,
            };
            self.speak(&segment.text, &segment.language, voice).await;
        }
    }

    /// Switch audio routing; failures are logged and ignored.
    pub async fn set_audio_mode(&self, mode: AudioMode) {
        if let Err(e) = self.engine.set_audio_mode(mode).await {
            log::warn!("narration: failed to set audio mode {mode:?}: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::tts::{RecordingTts, TtsCall};

    #[tokio::test]
    async fn segments_play_in_order_with_their_language() {
        let tts = Arc::new(RecordingTts::default());
        let narrator = SpeechNarrator::new(tts.clone());

        narrator
            .speak_segments(&[
                SpeechSegment::new("Bow.", "en-US", None),
                SpeechSegment::new("سُبْحَانَ", "ar-SA", Some(VoiceGender::Male)),
            ])
            .await;

        assert_eq!(
            tts.calls(),
            vec![
                TtsCall::Speak {
                    text: "Bow.".into(),
                    language: "en-US".into()
                },
                TtsCall::Speak {
                    text: "سُبْحَانَ".into(),
                    language: "ar-SA".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn failing_engine_is_swallowed_and_later_segments_still_play() {
        let tts = Arc::new(RecordingTts::failing());
        let narrator = SpeechNarrator::new(tts.clone());

        narrator
            .speak_segments(&[
                SpeechSegment::new("one", "en-US", None),
                SpeechSegment::new("two", "en-US", None),
            ])
            .await;
        narrator.set_audio_mode(AudioMode::RecordAndPlayback).await;

        assert_eq!(tts.spoken(), vec!["one", "two"]);
        assert_eq!(tts.modes(), vec![AudioMode::RecordAndPlayback]);
    }

    #[tokio::test]
    async fn blank_text_is_skipped() {
        let tts = Arc::new(RecordingTts::default());
        let narrator = SpeechNarrator::new(tts.clone());
        narrator.speak("   ", "en-US", VoiceOptions::default()).await;
        assert!(tts.calls().is_empty());
    }
}
