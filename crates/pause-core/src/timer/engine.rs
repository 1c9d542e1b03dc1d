//! Breathing session countdown.
//!
//! The timer is a two-state machine. It does not own a clock or a thread:
//! whoever drives it calls `tick()` once per period (see
//! [`TimerDriver`](super::TimerDriver)).
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --tick (remaining hits 0)--> Idle   [TimerCompleted]
//!                 Running --stop-------------------->  Idle   [TimerStopped]
//! ```
//!
//! Both exits reset `remaining_secs` to the session duration.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::events::Event;

/// Session lengths offered by default, in seconds.
pub const DEFAULT_DURATIONS: [u64; 6] = [30, 60, 120, 300, 600, 900];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimer {
    presets: Vec<u64>,
    duration_secs: u64,
    remaining_secs: u64,
    state: TimerState,
    #[serde(default)]
    session_id: Option<Uuid>,
}

impl SessionTimer {
    /// Create an idle timer using the default presets.
    ///
    /// # Errors
    /// Returns an error if `duration_secs` is not a default preset.
    pub fn new(duration_secs: u64) -> Result<Self, ValidationError> {
        Self::with_presets(DEFAULT_DURATIONS.to_vec(), duration_secs)
    }

    /// Create an idle timer limited to `presets`.
    ///
    /// # Errors
    /// Returns an error if `presets` is empty or contains 0, or if
    /// `duration_secs` is not one of them.
    pub fn with_presets(presets: Vec<u64>, duration_secs: u64) -> Result<Self, ValidationError> {
        if presets.is_empty() {
            return Err(ValidationError::EmptyCollection("duration presets".into()));
        }
        if presets.contains(&0) {
            return Err(ValidationError::InvalidValue {
                field: "durations".into(),
                message: "presets must be positive".into(),
            });
        }
        if !presets.contains(&duration_secs) {
            return Err(ValidationError::UnsupportedDuration {
                secs: duration_secs,
                allowed: presets,
            });
        }
        Ok(Self {
            presets,
            duration_secs,
            remaining_secs: duration_secs,
            state: TimerState::Idle,
            session_id: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn presets(&self) -> &[u64] {
        &self.presets
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Fraction of the session still ahead, 0.0 when idle.
    pub fn progress(&self) -> f64 {
        if !self.is_active() || self.duration_secs == 0 {
            return 0.0;
        }
        self.remaining_secs as f64 / self.duration_secs as f64
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            session_id: self.session_id,
            duration_secs: self.duration_secs,
            remaining_secs: self.remaining_secs,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `None` if a session is already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_active() {
            return None;
        }
        let session_id = Uuid::new_v4();
        self.remaining_secs = self.duration_secs;
        self.state = TimerState::Running;
        self.session_id = Some(session_id);
        debug!(%session_id, duration_secs = self.duration_secs, "timer started");
        Some(Event::TimerStarted {
            session_id,
            duration_secs: self.duration_secs,
            at: Utc::now(),
        })
    }

    /// Manual stop. Returns `None` when idle; never reports completion.
    pub fn stop(&mut self) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        let remaining_secs = self.remaining_secs;
        let session_id = self.finish()?;
        debug!(%session_id, remaining_secs, "timer stopped");
        Some(Event::TimerStopped {
            session_id,
            duration_secs: self.duration_secs,
            remaining_secs,
            at: Utc::now(),
        })
    }

    /// Advance one period. Returns `Some(Event::TimerCompleted)` when the
    /// countdown reaches zero, `Some(Event::TimerTicked)` otherwise, and
    /// `None` while idle.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            let session_id = self.finish()?;
            debug!(%session_id, "timer completed");
            return Some(Event::TimerCompleted {
                session_id,
                duration_secs: self.duration_secs,
                at: Utc::now(),
            });
        }
        Some(Event::TimerTicked {
            session_id: self.session_id?,
            remaining_secs: self.remaining_secs,
            duration_secs: self.duration_secs,
            at: Utc::now(),
        })
    }

    /// Change the duration for the next session.
    ///
    /// Returns `Ok(None)` without changing anything while running.
    ///
    /// # Errors
    /// Returns an error if `duration_secs` is not a preset.
    pub fn set_duration(&mut self, duration_secs: u64) -> Result<Option<Event>, ValidationError> {
        if !self.presets.contains(&duration_secs) {
            return Err(ValidationError::UnsupportedDuration {
                secs: duration_secs,
                allowed: self.presets.clone(),
            });
        }
        if self.is_active() {
            return Ok(None);
        }
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        Ok(Some(Event::DurationChanged {
            duration_secs,
            at: Utc::now(),
        }))
    }

    /// Step to the next preset, wrapping around. `None` while running.
    pub fn cycle_duration(&mut self) -> Option<Event> {
        if self.is_active() {
            return None;
        }
        // An unknown current value restarts from the first preset.
        let next = match self.presets.iter().position(|&d| d == self.duration_secs) {
            Some(i) => self.presets[(i + 1) % self.presets.len()],
            None => self.presets[0],
        };
        self.set_duration(next).ok().flatten()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self) -> Option<Uuid> {
        self.state = TimerState::Idle;
        self.remaining_secs = self.duration_secs;
        self.session_id.take()
    }
}
