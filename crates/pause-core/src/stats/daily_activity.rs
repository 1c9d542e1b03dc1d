//! Per-day session counts for the activity heatmap.
//!
//! Counts are keyed by the local calendar date (`YYYY-MM-DD`) and stored as
//! one JSON object under `daily_activity`. The mapping is never pruned.
//! Reads go through [`DailyActivityLedger::recent_window`], which annotates
//! each day with a 0-4 intensity level.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{date_key, Clock};
use crate::error::{StoreError, ValidationError};
use crate::storage::{keys, read_or_absent, KvStore};

/// Highest intensity level.
pub const MAX_INTENSITY: u8 = 4;

/// Longest window [`window_ending`] will build, roughly ten years.
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// Heatmap bucket for a day's count: `0→0, 1-2→1, 3-5→2, 6-10→3, >10→4`.
pub fn intensity_of(count: u64) -> u8 {
    match count {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        6..=10 => 3,
        _ => MAX_INTENSITY,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: String,
    pub count: u64,
    pub intensity: u8,
}

pub struct DailyActivityLedger<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    days: BTreeMap<String, u64>,
}

impl<S: KvStore> DailyActivityLedger<S> {
    /// Hydrate from the store. A missing or malformed mapping is empty;
    /// entries whose count is not a non-negative integer are dropped.
    pub async fn load(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let days = match read_or_absent(&*store, keys::DAILY_ACTIVITY).await {
            Some(raw) => parse_days(&raw),
            None => BTreeMap::new(),
        };
        Self { store, clock, days }
    }

    /// Raw mapping of date key to count.
    pub fn days(&self) -> &BTreeMap<String, u64> {
        &self.days
    }

    pub fn count_on(&self, date: NaiveDate) -> u64 {
        self.days.get(&date_key(date)).copied().unwrap_or(0)
    }

    pub fn today_count(&self) -> u64 {
        self.count_on(self.clock.today())
    }

    pub fn today_intensity(&self) -> u8 {
        intensity_of(self.today_count())
    }

    /// Add one session to today and persist the whole mapping.
    ///
    /// # Errors
    /// Returns the write error; the in-memory count is kept.
    pub async fn increment_today(&mut self) -> Result<u64, StoreError> {
        let key = date_key(self.clock.today());
        let count = self.days.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);
        let count = *count;
        debug!(date = %key, count, "daily activity incremented");

        let json = serde_json::to_string(&self.days)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        self.store.set(keys::DAILY_ACTIVITY, &json).await?;
        Ok(count)
    }

    /// The last `days` calendar dates ending today, oldest first, with
    /// missing dates reported as 0.
    ///
    /// # Errors
    /// See [`window_ending`].
    pub fn recent_window(&self, days: u32) -> Result<Vec<DayActivity>, ValidationError> {
        window_ending(&self.days, self.clock.today(), days)
    }
}

fn parse_days(raw: &str) -> BTreeMap<String, u64> {
    let entries: BTreeMap<String, serde_json::Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "daily activity is not valid JSON, starting empty");
            return BTreeMap::new();
        }
    };
    entries
        .into_iter()
        .filter_map(|(date, value)| match value.as_u64() {
            Some(count) => Some((date, count)),
            None => {
                warn!(%date, %value, "dropping daily activity entry with invalid count");
                None
            }
        })
        .collect()
}

/// Build the window for an arbitrary end date. The result always holds
/// exactly `days` entries.
///
/// # Errors
/// Returns an error if `days` exceeds [`MAX_WINDOW_DAYS`] or the window
/// would start before the earliest representable date.
pub fn window_ending(
    mapping: &BTreeMap<String, u64>,
    end: NaiveDate,
    days: u32,
) -> Result<Vec<DayActivity>, ValidationError> {
    let invalid = |message: String| ValidationError::InvalidValue {
        field: "days".into(),
        message,
    };
    if days > MAX_WINDOW_DAYS {
        return Err(invalid(format!("at most {MAX_WINDOW_DAYS} days, got {days}")));
    }
    let start = end
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .ok_or_else(|| invalid(format!("{days} days before {end} is out of range")))?;

    Ok(start
        .iter_days()
        .take(days as usize)
        .map(|date| {
            let date = date_key(date);
            let count = mapping.get(&date).copied().unwrap_or(0);
            DayActivity {
                date,
                count,
                intensity: intensity_of(count),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::{Duration, Local, TimeZone};
    use proptest::prelude::*;

    fn clock_at(y: i32, m: u32, d: u32) -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn intensity_thresholds() {
        assert_eq!(intensity_of(0), 0);
        assert_eq!(intensity_of(1), 1);
        assert_eq!(intensity_of(2), 1);
        assert_eq!(intensity_of(3), 2);
        assert_eq!(intensity_of(5), 2);
        assert_eq!(intensity_of(6), 3);
        assert_eq!(intensity_of(10), 3);
        assert_eq!(intensity_of(11), 4);
        assert_eq!(intensity_of(u64::MAX), 4);
    }

    #[tokio::test]
    async fn empty_ledger_window() {
        let store = Arc::new(MemoryStore::new());
        let ledger = DailyActivityLedger::load(store, clock_at(2026, 3, 2)).await;
        let window = ledger.recent_window(7).unwrap();
        let dates: Vec<_> = window.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(
            dates,
            [
                "2026-02-24",
                "2026-02-25",
                "2026-02-26",
                "2026-02-27",
                "2026-02-28",
                "2026-03-01",
                "2026-03-02"
            ]
        );
        assert!(window.iter().all(|d| d.count == 0 && d.intensity == 0));
    }

    #[tokio::test]
    async fn three_sessions_today() {
        let store = Arc::new(MemoryStore::new());
        let clock = clock_at(2026, 5, 9);
        let mut ledger = DailyActivityLedger::load(store.clone(), clock.clone()).await;
        for _ in 0..3 {
            ledger.increment_today().await.unwrap();
        }
        assert_eq!(
            ledger.recent_window(1).unwrap(),
            vec![DayActivity {
                date: "2026-05-09".into(),
                count: 3,
                intensity: 2,
            }]
        );
        assert_eq!(
            store.snapshot(keys::DAILY_ACTIVITY).as_deref(),
            Some(r#"{"2026-05-09":3}"#)
        );

        let reloaded = DailyActivityLedger::load(store, clock).await;
        assert_eq!(reloaded.today_count(), 3);
        assert_eq!(reloaded.today_intensity(), 2);
    }

    #[tokio::test]
    async fn counts_split_across_midnight() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(
            Local.with_ymd_and_hms(2026, 6, 1, 23, 59, 0).unwrap(),
        ));
        let mut ledger = DailyActivityLedger::load(store, clock.clone()).await;
        ledger.increment_today().await.unwrap();
        clock.advance(Duration::minutes(2));
        ledger.increment_today().await.unwrap();
        ledger.increment_today().await.unwrap();

        let window = ledger.recent_window(2).unwrap();
        assert_eq!(window[0].date, "2026-06-01");
        assert_eq!(window[0].count, 1);
        assert_eq!(window[1].date, "2026-06-02");
        assert_eq!(window[1].count, 2);
    }

    #[tokio::test]
    async fn malformed_json_is_empty() {
        let store = Arc::new(MemoryStore::with_entries([(keys::DAILY_ACTIVITY, "{not json")]));
        let mut ledger = DailyActivityLedger::load(store.clone(), clock_at(2026, 1, 1)).await;
        assert!(ledger.days().is_empty());
        assert_eq!(ledger.increment_today().await.unwrap(), 1);
        assert_eq!(
            store.snapshot(keys::DAILY_ACTIVITY).as_deref(),
            Some(r#"{"2026-01-01":1}"#)
        );
    }

    #[tokio::test]
    async fn window_reads_stored_history() {
        let store = Arc::new(MemoryStore::with_entries([(
            keys::DAILY_ACTIVITY,
            r#"{"2026-04-01":12,"2026-04-03":6,"2025-12-31":1}"#,
        )]));
        let ledger = DailyActivityLedger::load(store, clock_at(2026, 4, 3)).await;
        let window = ledger.recent_window(3).unwrap();
        let summary: Vec<_> = window.iter().map(|d| (d.count, d.intensity)).collect();
        assert_eq!(summary, vec![(12, 4), (0, 0), (6, 3)]);
    }

    #[test]
    fn zero_day_window_is_empty() {
        let end = NaiveDate::from_ymd_opt(2026, 4, 3).unwrap();
        assert!(window_ending(&BTreeMap::new(), end, 0).unwrap().is_empty());
    }

    #[test]
    fn window_near_earliest_date_is_an_error() {
        let end = NaiveDate::MIN + Duration::days(2);
        assert_eq!(window_ending(&BTreeMap::new(), end, 3).unwrap().len(), 3);
        assert!(window_ending(&BTreeMap::new(), end, 5).is_err());
    }

    #[test]
    fn oversized_window_is_rejected() {
        let end = NaiveDate::from_ymd_opt(2026, 4, 3).unwrap();
        assert_eq!(
            window_ending(&BTreeMap::new(), end, MAX_WINDOW_DAYS).unwrap().len(),
            MAX_WINDOW_DAYS as usize
        );
        assert!(window_ending(&BTreeMap::new(), end, MAX_WINDOW_DAYS + 1).is_err());
        assert!(window_ending(&BTreeMap::new(), end, u32::MAX).is_err());
    }

    #[tokio::test]
    async fn invalid_entries_are_dropped_individually() {
        let store = Arc::new(MemoryStore::with_entries([(
            keys::DAILY_ACTIVITY,
            r#"{"2026-01-01":4,"2026-01-02":-1,"2026-01-03":2.5,"2026-01-04":"7","2026-01-05":1}"#,
        )]));
        let mut ledger = DailyActivityLedger::load(store.clone(), clock_at(2026, 1, 5)).await;
        assert_eq!(ledger.days().len(), 2);
        assert_eq!(ledger.count_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()), 4);

        assert_eq!(ledger.increment_today().await.unwrap(), 2);
        assert_eq!(
            store.snapshot(keys::DAILY_ACTIVITY).as_deref(),
            Some(r#"{"2026-01-01":4,"2026-01-05":2}"#)
        );
    }

    proptest! {
        #[test]
        fn intensity_is_monotonic(a in 0u64..10_000, b in 0u64..10_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(intensity_of(lo) <= intensity_of(hi));
            prop_assert!(intensity_of(hi) <= MAX_INTENSITY);
        }

        #[test]
        fn window_has_exact_length_and_ends_at_end(days in 1u32..400, offset in 0i64..3000) {
            let end = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset);
            let window = window_ending(&BTreeMap::new(), end, days).unwrap();
            prop_assert_eq!(window.len(), days as usize);
            prop_assert_eq!(window.last().map(|d| d.date.clone()), Some(date_key(end)));
            prop_assert!(window.windows(2).all(|w| w[0].date < w[1].date));
        }
    }
}
