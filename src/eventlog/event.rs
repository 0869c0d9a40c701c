//! Log record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the coach did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Start,
    Stop,
    NextStep,
    RepeatStep,
    FinalizationStep,
    VoiceCommand,
    TapAdvance,
    AutoPoseAdvance,
    PoseReading,
    Config,
}

/// One line of the coach log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerLogEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    /// Free-form details; `null` when there are none.
    #[serde(default)]
    pub payload: Value,
}

impl PrayerLogEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_serialises_snake_case() {
        assert_eq!(
            serde_json::to_string(&EventKind::AutoPoseAdvance).unwrap(),
            "\"auto_pose_advance\""
        );
        assert_eq!(
            serde_json::to_string(&EventKind::FinalizationStep).unwrap(),
            "\"finalization_step\""
        );
    }

    #[test]
    fn missing_payload_reads_as_null() {
        let line = r#"{"timestamp":"2026-01-01T05:00:00Z","kind":"start"}"#;
        let event: PrayerLogEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.kind, EventKind::Start);
        assert_eq!(event.payload, Value::Null);
    }

    #[test]
    fn json_line_shape() {
        let event = PrayerLogEvent::new(EventKind::Stop, json!({ "reason": "user" }));
        let v: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(v["kind"], "stop");
        assert_eq!(v["payload"]["reason"], "user");
        assert!(v["timestamp"].is_string());
    }
}
