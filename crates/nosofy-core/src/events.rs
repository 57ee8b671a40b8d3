use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerCategory, TimerState};

/// Every timer state change produces an Event.
/// The CLI prints them; the dashboard reacts to `SessionCompleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        category: TimerCategory,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        category: TimerCategory,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A work countdown reached zero naturally.
    SessionCompleted {
        duration_min: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        category: TimerCategory,
        remaining_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
}
