//! Configuration module for the prayer coach.
//!
//! Provides `AppConfig` (top-level settings), the per-session
//! `CoachConfiguration`, detector tuning sub-configs, `AppPaths` for
//! cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, CoachConfiguration, EventLogConfig, InputMode, MotionConfig, TapConfig,
    VoiceGender,
};
