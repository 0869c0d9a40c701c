//! Voice command recognizer.
//!
//! [`VoiceCommandRecognizer`] wraps a [`SpeechRecognizer`] session and keeps
//! the state the presentation layer shows: listening flag, committed
//! results, the in-progress partial transcript, and the last error.
//!
//! Both partial and committed transcripts are scanned for commands.  One
//! utterance (a run of partials closed by a final result) yields at most one
//! command, so a partial "next" followed by the final "next" advances once.

use std::sync::Arc;

use crate::diagnostics::ErrorRecorder;

use super::command::{parse_command, VoiceCommand};
use super::engine::{SpeechEvent, SpeechRecognizer};

pub struct VoiceCommandRecognizer {
    engine: Arc<dyn SpeechRecognizer>,
    recorder: Arc<dyn ErrorRecorder>,
    started: bool,
    listening: bool,
    results: Vec<String>,
    partial: String,
    error: Option<String>,
    /// A command was already taken from the current utterance.
    utterance_consumed: bool,
}

impl VoiceCommandRecognizer {
    pub fn new(engine: Arc<dyn SpeechRecognizer>, recorder: Arc<dyn ErrorRecorder>) -> Self {
        Self {
            engine,
            recorder,
            started: false,
            listening: false,
            results: Vec::new(),
            partial: String::new(),
            error: None,
            utterance_consumed: false,
        }
    }

    /// Reset transcripts and begin a session in `language`.
    ///
    /// No-op when already started.  A refused session leaves the recognizer
    /// stopped with [`error`](Self::error) set; nothing is returned to the
    /// caller.
    pub async fn start(&mut self, language: &str) {
        if self.started {
            return;
        }
        self.listening = false;
        self.results.clear();
        self.partial.clear();
        self.error = None;
        self.utterance_consumed = false;

        match self.engine.start_session(language).await {
            Ok(()) => {
                self.started = true;
                log::debug!("voice: session started ({language})");
            }
            Err(e) => {
                self.recorder.record(&e, "voice.start");
                self.error = Some(e.to_string());
            }
        }
    }

    /// End the session.  No-op when not started.
    pub async fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.started = false;
        self.listening = false;
        self.partial.clear();
        if let Err(e) = self.engine.stop_session().await {
            self.recorder.record(&e, "voice.stop");
        }
        log::debug!("voice: session stopped");
    }

    /// Apply one engine callback; returns a command if this event completes
    /// one.  Events are ignored while stopped.
    pub fn handle(&mut self, event: SpeechEvent) -> Option<VoiceCommand> {
        if !self.started {
            return None;
        }
        match event {
            SpeechEvent::Listening(listening) => {
                self.listening = listening;
                None
            }
            SpeechEvent::Partial(text) => {
                let command = self.scan(&text);
                self.partial = text;
                command
            }
            SpeechEvent::Final(text) => {
                let command = self.scan(&text);
                self.partial.clear();
                self.results.push(text);
                self.utterance_consumed = false;
                command
            }
            SpeechEvent::Error(message) => {
                self.recorder.record(&message, "voice.recognition");
                self.listening = false;
                self.error = Some(message);
                self.partial.clear();
                self.utterance_consumed = false;
                None
            }
        }
    }

    fn scan(&mut self, text: &str) -> Option<VoiceCommand> {
        if self.utterance_consumed {
            return None;
        }
        let command = parse_command(text)?;
        self.utterance_consumed = true;
        Some(command)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Committed transcripts since the session started.
    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn partial(&self) -> &str {
        &self.partial
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
