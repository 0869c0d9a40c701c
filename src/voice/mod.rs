//! Voice command input.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │          VoiceCommandRecognizer                      │
//! │                                                     │
//! │  start(lang) ──▶ SpeechRecognizer::start_session    │
//! │                                                     │
//! │  SpeechEvent ──▶ handle() ──▶ parse_command()       │
//! │  (Listening / Partial / Final / Error)   │          │
//! │                                          ▼          │
//! │                            Option<VoiceCommand>     │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod engine;
pub mod recognizer;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use command::{parse_command, VoiceCommand};
pub use engine::{PassiveRecognizer, RecognizerError, SpeechEvent, SpeechRecognizer};
pub use recognizer::VoiceCommandRecognizer;

#[cfg(test)]
pub use engine::MockRecognizer;
