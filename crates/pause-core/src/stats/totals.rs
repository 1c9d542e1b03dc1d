//! All-time session totals.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::storage::{keys, read_u64, KvStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_sessions: u64,
    pub total_duration_secs: u64,
}

/// Running totals of started sessions and their durations.
///
/// Purely additive: two calls with the same duration count two sessions.
pub struct StatsAccumulator<S> {
    store: Arc<S>,
    stats: Stats,
}

impl<S: KvStore> StatsAccumulator<S> {
    pub async fn load(store: Arc<S>) -> Self {
        let stats = Stats {
            total_sessions: read_u64(&*store, keys::TOTAL_PAUSES).await,
            total_duration_secs: read_u64(&*store, keys::TOTAL_TIME).await,
        };
        Self { store, stats }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// # Errors
    /// Returns the first failed write. In-memory totals are updated regardless.
    pub async fn increment_stats(&mut self, duration_secs: u64) -> Result<Stats, StoreError> {
        self.stats.total_sessions = self.stats.total_sessions.saturating_add(1);
        self.stats.total_duration_secs = self.stats.total_duration_secs.saturating_add(duration_secs);
        debug!(stats = ?self.stats, "stats incremented");

        self.store
            .set(keys::TOTAL_PAUSES, &self.stats.total_sessions.to_string())
            .await?;
        self.store
            .set(keys::TOTAL_TIME, &self.stats.total_duration_secs.to_string())
            .await?;
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn increments_are_not_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let mut acc = StatsAccumulator::load(store.clone()).await;
        acc.increment_stats(60).await.unwrap();
        let stats = acc.increment_stats(60).await.unwrap();
        assert_eq!(
            stats,
            Stats {
                total_sessions: 2,
                total_duration_secs: 120
            }
        );
        assert_eq!(store.snapshot(keys::TOTAL_PAUSES).as_deref(), Some("2"));
        assert_eq!(store.snapshot(keys::TOTAL_TIME).as_deref(), Some("120"));
    }

    #[tokio::test]
    async fn continues_from_stored_totals() {
        let store = Arc::new(MemoryStore::with_entries([
            (keys::TOTAL_PAUSES, "10"),
            (keys::TOTAL_TIME, "900"),
        ]));
        let mut acc = StatsAccumulator::load(store).await;
        assert_eq!(acc.stats().total_sessions, 10);
        let stats = acc.increment_stats(300).await.unwrap();
        assert_eq!(stats.total_sessions, 11);
        assert_eq!(stats.total_duration_secs, 1200);
    }

    #[tokio::test]
    async fn corrupt_values_read_as_zero() {
        let store = Arc::new(MemoryStore::with_entries([
            (keys::TOTAL_PAUSES, "-3"),
            (keys::TOTAL_TIME, "lots"),
        ]));
        let acc = StatsAccumulator::load(store).await;
        assert_eq!(acc.stats(), Stats::default());
    }
}
