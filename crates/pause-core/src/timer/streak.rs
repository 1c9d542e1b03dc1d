//! Daily streak continuity.
//!
//! A streak survives as long as sessions keep starting within the reset
//! window (24 hours by default) of each other. The gap is checked once,
//! when the tracker is loaded: a streak that lapses while a tracker is held
//! in memory only drops to 0 on the next `load`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::StoreError;
use crate::storage::{keys, read_u64, KvStore};

/// Default reset window: 24 hours in milliseconds.
pub const STREAK_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakRecord {
    /// Effective streak, already reset if the window lapsed at load time.
    pub streak_count: u64,
    /// Epoch milliseconds of the last started session, 0 if never.
    pub last_session_ms: u64,
}

pub struct StreakTracker<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    window_ms: u64,
    record: StreakRecord,
}

impl<S: KvStore> StreakTracker<S> {
    /// Hydrate from the store with the default 24 hour window.
    pub async fn load(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self::load_with_window(store, clock, STREAK_WINDOW_MS).await
    }

    pub async fn load_with_window(store: Arc<S>, clock: Arc<dyn Clock>, window_ms: u64) -> Self {
        let last_session_ms = read_u64(&*store, keys::LAST_PAUSE).await;
        let now = clock.now_ms();

        let streak_count = if now.saturating_sub(last_session_ms) > window_ms {
            if last_session_ms > 0 {
                info!(
                    gap_ms = now.saturating_sub(last_session_ms),
                    "streak window lapsed, streak reset"
                );
            }
            0
        } else {
            read_u64(&*store, keys::STREAK).await
        };

        Self {
            store,
            clock,
            window_ms,
            record: StreakRecord {
                streak_count,
                last_session_ms,
            },
        }
    }

    pub fn streak(&self) -> u64 {
        self.record.streak_count
    }

    pub fn record(&self) -> StreakRecord {
        self.record
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Count one more session and stamp it with the current time.
    ///
    /// The in-memory record is updated before persisting, so a failed write
    /// still shows the new streak for the rest of this tracker's life.
    ///
    /// # Errors
    /// Returns the first failed write; the timestamp is not written if the
    /// streak write fails.
    pub async fn increment_streak(&mut self) -> Result<u64, StoreError> {
        let now = self.clock.now_ms();
        self.record = StreakRecord {
            streak_count: self.record.streak_count.saturating_add(1),
            last_session_ms: now,
        };
        debug!(streak = self.record.streak_count, "streak incremented");

        self.store
            .set(keys::STREAK, &self.record.streak_count.to_string())
            .await?;
        self.store.set(keys::LAST_PAUSE, &now.to_string()).await?;
        Ok(self.record.streak_count)
    }
}
