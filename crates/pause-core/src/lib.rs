//! # Pause Core Library
//!
//! This library provides the engine behind the Pause breathing timer: the
//! session countdown, the daily streak, all-time totals and the per-day
//! activity heatmap. The `pause` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer**: a two-state countdown ([`SessionTimer`]) driven by a single
//!   tokio tick task ([`TimerDriver`])
//! - **Trackers**: [`StreakTracker`], [`StatsAccumulator`] and
//!   [`DailyActivityLedger`], each hydrated from and persisted to a
//!   [`KvStore`]
//! - **Storage**: SQLite-backed [`Database`] or in-memory [`MemoryStore`],
//!   plus TOML-based [`Config`]
//! - **Presentation data**: [`ThemeManager`] and [`AffirmationCatalog`]
//!
//! ## Key Components
//!
//! - [`SessionOrchestrator`]: what happens when a session starts and ends
//! - [`Event`]: every timer state change

pub mod affirmations;
pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod theme;
pub mod timer;

pub use affirmations::AffirmationCatalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use session::{SessionOrchestrator, SessionSummary};
pub use stats::{intensity_of, DailyActivityLedger, DayActivity, Stats, StatsAccumulator};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use theme::{Direction, Theme, ThemeCatalog, ThemeManager};
pub use timer::{EventReceiver, SessionTimer, StreakTracker, TimerDriver, TimerState};
