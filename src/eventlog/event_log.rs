//! Append-only coach log.
//!
//! Each [`PrayerLogEvent`] is one JSON line under a single store key.
//! Appends are fire-and-forget: failures are logged at `warn` and dropped.

use std::sync::Arc;

use serde_json::Value;

use super::event::{EventKind, PrayerLogEvent};
use super::store::LogStore;

#[derive(Clone)]
pub struct EventLog {
    store: Arc<dyn LogStore>,
    key: String,
}

impl EventLog {
    pub fn new(store: Arc<dyn LogStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Append one event as a JSON line.  Never fails.
    pub async fn append(&self, event: &PrayerLogEvent) {
        let mut line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("event log: could not serialise {:?}: {e}", event.kind);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.store.append(&self.key, &line).await {
            log::warn!("event log: append failed: {e}");
        }
    }

    /// Build a timestamped event and append it.
    pub async fn record(&self, kind: EventKind, payload: Value) {
        self.append(&PrayerLogEvent::new(kind, payload)).await;
    }

    /// Every readable event in insertion order.  Malformed lines are skipped;
    /// an unreadable store yields an empty list.
    pub async fn read_all(&self) -> Vec<PrayerLogEvent> {
        let content = match self.store.get(&self.key).await {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("event log: read failed: {e}");
                return Vec::new();
            }
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(event) => Some(event),
                Err(e) => {
                    log::warn!("event log: skipping malformed line: {e}");
                    None
                }
            })
            .collect()
    }

    /// Remove every event.
    pub async fn clear(&self) {
        if let Err(e) = self.store.set(&self.key, "").await {
            log::warn!("event log: clear failed: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
