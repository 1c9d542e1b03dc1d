//! Periodic tick source for [`SessionTimer`].
//!
//! The driver owns at most one tokio task calling `SessionTimer::tick`.
//! Starting a session aborts any previous task before spawning a new one;
//! stop, natural completion and drop all end it. Every event the timer
//! produces is forwarded on an unbounded channel.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};
use uuid::Uuid;

use super::engine::SessionTimer;
use crate::error::ValidationError;
use crate::events::Event;

pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

pub struct TimerDriver {
    timer: Arc<Mutex<SessionTimer>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    tick_interval: Duration,
    events: mpsc::UnboundedSender<Event>,
}

impl TimerDriver {
    pub fn new(timer: SessionTimer, tick_interval: Duration) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            timer: Arc::new(Mutex::new(timer)),
            ticker: Mutex::new(None),
            tick_interval,
            events: tx,
        };
        (driver, rx)
    }

    pub fn is_active(&self) -> bool {
        lock(&self.timer).is_active()
    }

    pub fn duration_secs(&self) -> u64 {
        lock(&self.timer).duration_secs()
    }

    pub fn remaining_secs(&self) -> u64 {
        lock(&self.timer).remaining_secs()
    }

    pub fn snapshot(&self) -> Event {
        lock(&self.timer).snapshot()
    }

    /// Whether a tick task is currently alive.
    pub fn has_ticker(&self) -> bool {
        lock(&self.ticker)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start a session and its tick task. `None` if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Option<Event> {
        let (event, session_id) = {
            let mut timer = lock(&self.timer);
            let event = timer.start()?;
            self.publish(event.clone());
            (event, timer.session_id()?)
        };
        self.spawn_ticker(session_id);
        Some(event)
    }

    /// Manual stop. `None` if idle.
    pub fn stop(&self) -> Option<Event> {
        let event = {
            let mut timer = lock(&self.timer);
            let event = timer.stop()?;
            self.publish(event.clone());
            event
        };
        self.cancel_ticker();
        Some(event)
    }

    /// # Errors
    /// Returns an error if `duration_secs` is not a preset.
    pub fn set_duration(&self, duration_secs: u64) -> Result<Option<Event>, ValidationError> {
        let mut timer = lock(&self.timer);
        let event = timer.set_duration(duration_secs)?;
        if let Some(ref e) = event {
            self.publish(e.clone());
        }
        Ok(event)
    }

    pub fn cycle_duration(&self) -> Option<Event> {
        let mut timer = lock(&self.timer);
        let event = timer.cycle_duration()?;
        self.publish(event.clone());
        Some(event)
    }

    /// Callers hold the timer lock so the channel order matches the order
    /// of state changes.
    fn publish(&self, event: Event) {
        // A dropped receiver only means nobody is listening.
        let _ = self.events.send(event);
    }

    fn spawn_ticker(&self, session_id: Uuid) {
        let mut ticker = lock(&self.ticker);
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let timer = self.timer.clone();
        let events = self.events.clone();
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;

                let terminal = {
                    let mut guard = lock(&timer);
                    // An aborted task can still wake once; never tick a newer session.
                    if guard.session_id() != Some(session_id) {
                        break;
                    }
                    let Some(event) = guard.tick() else {
                        break;
                    };
                    trace!(?event, "tick");
                    let terminal = event.is_terminal();
                    // Sent under the lock so a concurrent stop cannot overtake it.
                    let _ = events.send(event);
                    terminal
                };
                if terminal {
                    debug!(%session_id, "tick task finished");
                    break;
                }
            }
        });

        *ticker = Some(handle);
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(duration: u64) -> (TimerDriver, EventReceiver) {
        let timer = SessionTimer::with_presets(vec![3, 5, 60], duration).unwrap();
        TimerDriver::new(timer, Duration::from_secs(1))
    }

    fn drain(rx: &mut EventReceiver) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_natural_completion() {
        let (driver, mut rx) = driver(3);
        assert!(driver.start().is_some());
        time::sleep(Duration::from_millis(3500)).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], Event::TimerStarted { duration_secs: 3, .. }));
        assert!(matches!(events[1], Event::TimerTicked { remaining_secs: 2, .. }));
        assert!(matches!(events[2], Event::TimerTicked { remaining_secs: 1, .. }));
        assert!(matches!(events[3], Event::TimerCompleted { .. }));
        assert!(!driver.is_active());
        assert_eq!(driver.remaining_secs(), 3);
        assert!(!driver.has_ticker());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_ticks() {
        let (driver, mut rx) = driver(60);
        driver.start();
        time::sleep(Duration::from_millis(2500)).await;
        let stopped = driver.stop();
        assert!(matches!(
            stopped,
            Some(Event::TimerStopped { remaining_secs: 58, .. })
        ));
        assert_eq!(driver.remaining_secs(), 60);

        drain(&mut rx);
        time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut rx).is_empty());
        assert!(!driver.has_ticker());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_ticks() {
        let (driver, mut rx) = driver(60);
        driver.start();
        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(drain(&mut rx).len(), 3);

        drop(driver);
        time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_is_the_last_event_under_contention() {
        for _ in 0..20 {
            let timer = SessionTimer::with_presets(vec![900], 900).unwrap();
            let (driver, mut rx) = TimerDriver::new(timer, Duration::from_millis(1));
            driver.start();
            tokio::time::sleep(Duration::from_millis(5)).await;
            driver.stop();
            tokio::time::sleep(Duration::from_millis(10)).await;

            let events = drain(&mut rx);
            assert!(matches!(events.last(), Some(Event::TimerStopped { .. })));
            assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn restart_never_double_decrements() {
        let (driver, _rx) = driver(60);
        driver.start();
        time::sleep(Duration::from_millis(1500)).await;
        driver.stop();
        driver.start();
        assert!(driver.start().is_none());
        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(driver.remaining_secs(), 58);
    }

    #[tokio::test(start_paused = true)]
    async fn duration_changes_wait_for_idle() {
        let (driver, _rx) = driver(3);
        driver.start();
        assert!(driver.set_duration(5).unwrap().is_none());
        assert!(driver.cycle_duration().is_none());
        driver.stop();
        assert!(driver.set_duration(5).unwrap().is_some());
        assert_eq!(driver.duration_secs(), 5);
        assert!(driver.set_duration(4).is_err());
    }
}
