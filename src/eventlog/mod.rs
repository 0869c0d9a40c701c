//! Append-only, timestamped record of every coach action.
//!
//! ```rust
//! use std::sync::Arc;
//! use prayer_coach::eventlog::{EventKind, EventLog, MemoryLogStore};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let log = EventLog::new(Arc::new(MemoryLogStore::new()), "coach");
//! log.record(EventKind::Start, serde_json::json!({ "mode": "voice" })).await;
//! assert_eq!(log.read_all().await.len(), 1);
//! # });
//! ```

pub mod event;
pub mod event_log;
pub mod store;

pub use event::{EventKind, PrayerLogEvent};
pub use event_log::EventLog;
pub use store::{FileLogStore, LogStore, MemoryLogStore, StoreError};
