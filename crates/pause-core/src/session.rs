//! Session orchestration.
//!
//! Starting a session updates the streak, the totals and today's activity,
//! each persisted on its own, then starts the countdown. Natural completion
//! and manual stop only touch the timer.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::ValidationError;
use crate::events::Event;
use crate::stats::{DailyActivityLedger, DayActivity, Stats, StatsAccumulator};
use crate::storage::{Config, KvStore};
use crate::timer::{EventReceiver, SessionTimer, StreakTracker, TimerDriver};

/// What the screen shows between sessions.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub streak: u64,
    pub stats: Stats,
    pub today_count: u64,
    pub today_intensity: u8,
    pub timer: Event,
}

pub struct SessionOrchestrator<S> {
    streak: StreakTracker<S>,
    stats: StatsAccumulator<S>,
    activity: DailyActivityLedger<S>,
    driver: TimerDriver,
}

impl<S: KvStore> SessionOrchestrator<S> {
    /// Hydrate every tracker from `store` and build an idle timer from
    /// `config`.
    ///
    /// # Errors
    /// Returns an error if the configured default duration is not a preset.
    pub async fn load(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Result<(Self, EventReceiver), ValidationError> {
        let timer = SessionTimer::with_presets(
            config.timer.durations.clone(),
            config.timer.default_duration_secs,
        )?;
        let (driver, events) =
            TimerDriver::new(timer, Duration::from_millis(config.timer.tick_interval_ms));

        let streak =
            StreakTracker::load_with_window(store.clone(), clock.clone(), config.streak_window_ms())
                .await;
        let stats = StatsAccumulator::load(store.clone()).await;
        let activity = DailyActivityLedger::load(store, clock).await;

        Ok((Self::from_parts(streak, stats, activity, driver), events))
    }

    pub fn from_parts(
        streak: StreakTracker<S>,
        stats: StatsAccumulator<S>,
        activity: DailyActivityLedger<S>,
        driver: TimerDriver,
    ) -> Self {
        Self {
            streak,
            stats,
            activity,
            driver,
        }
    }

    pub fn is_active(&self) -> bool {
        self.driver.is_active()
    }

    pub fn streak(&self) -> u64 {
        self.streak.streak()
    }

    pub fn stats(&self) -> Stats {
        self.stats.stats()
    }

    /// # Errors
    /// Returns an error for windows longer than `MAX_WINDOW_DAYS`.
    pub fn recent_activity(&self, days: u32) -> Result<Vec<DayActivity>, ValidationError> {
        self.activity.recent_window(days)
    }

    pub fn driver(&self) -> &TimerDriver {
        &self.driver
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            streak: self.streak.streak(),
            stats: self.stats.stats(),
            today_count: self.activity.today_count(),
            today_intensity: self.activity.today_intensity(),
            timer: self.driver.snapshot(),
        }
    }

    /// Record a started session and begin the countdown.
    ///
    /// Does nothing and returns `None` while a session is running. Store
    /// failures are logged and do not prevent the session from starting.
    pub async fn begin_session(&mut self) -> Option<Event> {
        if self.driver.is_active() {
            debug!("session already running, start ignored");
            return None;
        }
        let duration_secs = self.driver.duration_secs();

        if let Err(e) = self.streak.increment_streak().await {
            warn!(error = %e, "failed to persist streak");
        }
        if let Err(e) = self.stats.increment_stats(duration_secs).await {
            warn!(error = %e, "failed to persist session totals");
        }
        if let Err(e) = self.activity.increment_today().await {
            warn!(error = %e, "failed to persist daily activity");
        }

        self.driver.start()
    }

    /// Manual stop. `None` if no session is running.
    pub fn end_session(&mut self) -> Option<Event> {
        self.driver.stop()
    }

    /// # Errors
    /// Returns an error if `duration_secs` is not a preset.
    pub fn set_duration(&mut self, duration_secs: u64) -> Result<Option<Event>, ValidationError> {
        self.driver.set_duration(duration_secs)
    }

    pub fn cycle_duration(&mut self) -> Option<Event> {
        self.driver.cycle_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::{keys, MemoryStore};
    use chrono::Local;

    async fn orchestrator(
        store: Arc<MemoryStore>,
    ) -> (SessionOrchestrator<MemoryStore>, EventReceiver) {
        let clock = Arc::new(FixedClock::new(Local::now()));
        SessionOrchestrator::load(store, clock, &Config::default())
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn start_updates_every_record() {
        let store = Arc::new(MemoryStore::new());
        let (mut orch, _rx) = orchestrator(store.clone()).await;

        let started = orch.begin_session().await;
        assert!(matches!(started, Some(Event::TimerStarted { duration_secs: 60, .. })));
        assert!(orch.is_active());

        let summary = orch.summary();
        assert_eq!(summary.streak, 1);
        assert_eq!(summary.stats.total_sessions, 1);
        assert_eq!(summary.stats.total_duration_secs, 60);
        assert_eq!(summary.today_count, 1);
        assert_eq!(store.snapshot(keys::TOTAL_TIME).as_deref(), Some("60"));
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_while_running_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let (mut orch, _rx) = orchestrator(store).await;
        orch.begin_session().await;
        assert!(orch.begin_session().await.is_none());
        assert_eq!(orch.stats().total_sessions, 1);
        assert_eq!(orch.streak(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_does_not_persist() {
        let store = Arc::new(MemoryStore::new());
        let (mut orch, _rx) = orchestrator(store.clone()).await;
        orch.begin_session().await;
        let before = store.snapshot(keys::DAILY_ACTIVITY);
        assert!(matches!(orch.end_session(), Some(Event::TimerStopped { .. })));
        assert_eq!(store.snapshot(keys::DAILY_ACTIVITY), before);
        assert!(orch.end_session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn write_failures_do_not_block_the_session() {
        let store = Arc::new(MemoryStore::new());
        let (mut orch, _rx) = orchestrator(store.clone()).await;
        store.fail_writes(true);

        assert!(orch.begin_session().await.is_some());
        assert!(orch.is_active());
        assert_eq!(orch.streak(), 1);
        assert!(store.snapshot(keys::STREAK).is_none());
    }

    #[tokio::test]
    async fn invalid_default_duration_is_rejected() {
        let mut config = Config::default();
        config.timer.default_duration_secs = 45;
        let result = SessionOrchestrator::load(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock::new(Local::now())),
            &config,
        )
        .await;
        assert!(result.is_err());
    }
}
