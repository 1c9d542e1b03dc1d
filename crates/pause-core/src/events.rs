use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::TimerState;

/// Every timer state change produces an Event.
/// The CLI prints them; embedders subscribe through the driver channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        session_id: Uuid,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerTicked {
        session_id: Uuid,
        remaining_secs: u64,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero on its own.
    TimerCompleted {
        session_id: Uuid,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The user ended the session early.
    TimerStopped {
        session_id: Uuid,
        duration_secs: u64,
        /// Seconds that were still left when the stop arrived.
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    DurationChanged {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        session_id: Option<Uuid>,
        duration_secs: u64,
        remaining_secs: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True for the two events that end a session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::TimerCompleted { .. } | Event::TimerStopped { .. }
        )
    }
}
