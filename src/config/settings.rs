//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to the coach
//! task by value.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// InputMode
// ---------------------------------------------------------------------------

/// Which input modality may advance the prayer automatically.
///
/// Exactly one modality is active while a session runs.
///
/// | Variant | Detector                | Audio routing       |
/// |---------|-------------------------|---------------------|
/// | Manual  | `TapSpikeDetector`      | playback            |
/// | Voice   | `VoiceCommandRecognizer`| record + playback   |
/// | Motion  | `MotionPoseClassifier`  | playback            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// A burst of taps on the device advances to the next step.
    Manual,
    /// Spoken "next" / "repeat" commands.
    Voice,
    /// Inferred body pose from accelerometer + gyroscope.
    Motion,
}

impl Default for InputMode {
    fn default() -> Self {
        Self::Manual
    }
}

impl InputMode {
    /// Lowercase name used in log payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Manual => "manual",
            InputMode::Voice => "voice",
            InputMode::Motion => "motion",
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceGender
// ---------------------------------------------------------------------------

/// Preferred narrator voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Female,
    Male,
}

// ---------------------------------------------------------------------------
// CoachConfiguration
// ---------------------------------------------------------------------------

/// Per-session coach settings.
///
/// Supplied to `RitualStepSequencer::start` and immutable for the duration of
/// that session; starting again creates a new configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachConfiguration {
    /// Number of cycles (rakat) in the prayer.  Must be at least 1.
    pub total_rakat: u32,
    /// In motion mode, advance when the inferred pose matches the current
    /// step's posture.
    pub auto_advance_from_pose: bool,
    /// BCP-47 tag for the primary narration and speech recognition
    /// (e.g. `"en-US"`).
    pub language: String,
    /// BCP-47 tag for sacred-language recitations.  `None` skips them.
    pub sacred_language: Option<String>,
    /// Preferred narrator voice; `None` lets the TTS engine choose.
    pub voice_gender: Option<VoiceGender>,
    /// Active input modality.
    pub mode: InputMode,
}

impl Default for CoachConfiguration {
    fn default() -> Self {
        Self {
            total_rakat: 2,
            auto_advance_from_pose: false,
            language: "en-US".into(),
            sacred_language: Some("ar-SA".into()),
            voice_gender: None,
            mode: InputMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// TapConfig
// ---------------------------------------------------------------------------

/// Tuning for the tap-burst gesture detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Accelerometer sampling interval requested from the sensor source.
    pub sample_interval_ms: u64,
    /// Sliding window in which `min_spikes` spikes must land.
    pub window_ms: u64,
    /// Minimum `|magnitude − 1 g|` for a sample to count as a spike.
    pub threshold_g: f32,
    /// Spikes inside the window required for a detection.
    pub min_spikes: usize,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 50,
            window_ms: 800,
            threshold_g: 2.0,
            min_spikes: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// MotionConfig
// ---------------------------------------------------------------------------

/// Tuning for the pose classifier and pose-driven auto-advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Sampling interval for both accelerometer and gyroscope.
    pub sample_interval_ms: u64,
    /// Readings at or above this confidence may auto-advance.
    pub advance_confidence: f32,
    /// Minimum spacing between logged `pose_reading` events.
    pub pose_log_interval_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
            advance_confidence: 0.5,
            pose_log_interval_ms: 2_000,
        }
    }
}

// ---------------------------------------------------------------------------
// EventLogConfig
// ---------------------------------------------------------------------------

/// Where the append-only coach log lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogConfig {
    /// Store key; the file store writes `<dir>/<key>.jsonl`.
    pub key: String,
    /// Directory override; `None` uses [`AppPaths::data_dir`].
    pub dir: Option<PathBuf>,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            key: "prayer-coach-log".into(),
            dir: None,
        }
    }
}

impl EventLogConfig {
    /// Resolved store directory.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| AppPaths::new().data_dir)
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use prayer_coach::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session defaults handed to the sequencer on start.
    pub coach: CoachConfiguration,
    /// Tap-burst detector tuning.
    pub tap: TapConfig,
    /// Pose classifier tuning.
    pub motion: MotionConfig,
    /// Event log location.
    pub event_log: EventLogConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
