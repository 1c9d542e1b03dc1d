//! Statistics module for Pause
//!
//! All-time totals and the per-day activity ledger behind the heatmap.

mod daily_activity;
mod totals;

pub use daily_activity::{
    intensity_of, window_ending, DailyActivityLedger, DayActivity, MAX_INTENSITY, MAX_WINDOW_DAYS,
};
pub use totals::{Stats, StatsAccumulator};
