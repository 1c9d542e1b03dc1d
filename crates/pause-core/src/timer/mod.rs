mod driver;
mod engine;
mod streak;

pub use driver::{EventReceiver, TimerDriver};
pub use engine::{SessionTimer, TimerState, DEFAULT_DURATIONS};
pub use streak::{StreakRecord, StreakTracker, STREAK_WINDOW_MS};
