//! Guided prayer coach.
//!
//! Walks a worshipper through a fixed sequence of ritual steps, repeated
//! for a configured number of cycles (rakat) and followed by a closing
//! sequence.  Each step is narrated, marked with a haptic pulse, and
//! recorded in an append-only event log.  Progress is driven by one of
//! three input modalities:
//!
//! | Mode     | Detector                              | Advances on                  |
//! |----------|---------------------------------------|------------------------------|
//! | `manual` | [`sensors::TapSpikeDetector`]         | a burst of taps on the phone |
//! | `voice`  | [`voice::VoiceCommandRecognizer`]     | "next" / "repeat"            |
//! | `motion` | [`sensors::MotionPoseClassifier`]     | a confident matching posture |
//!
//! [`coach::CoachRunner`] owns the sequencer and serialises every command
//! and input through a single channel.

pub mod coach;
pub mod config;
pub mod diagnostics;
pub mod eventlog;
pub mod narration;
pub mod ritual;
pub mod sensors;
pub mod voice;
