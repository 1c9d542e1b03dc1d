mod config;
pub mod database;
pub mod memory;

pub use config::{ActivityConfig, AffirmationsConfig, Config, StreakConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::future::Future;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{ConfigError, StoreError};

/// Keys written to the store. Values are decimal strings except
/// `daily_activity` (JSON object) and `theme` (theme name).
pub mod keys {
    pub const STREAK: &str = "streak";
    pub const LAST_PAUSE: &str = "last_pause";
    pub const TOTAL_PAUSES: &str = "total_pauses";
    pub const TOTAL_TIME: &str = "total_time";
    pub const DAILY_ACTIVITY: &str = "daily_activity";
    pub const THEME: &str = "theme";
}

/// Durable string-keyed store.
///
/// No transactions and no atomicity across keys: two writes issued for one
/// logical update can be split by a crash, and overlapping writers race with
/// last-write-wins.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Read a key, treating failures as absence.
pub(crate) async fn read_or_absent<S: KvStore>(store: &S, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "store read failed, using default");
            None
        }
    }
}

/// Read a decimal counter. Missing, unreadable or malformed values are 0.
pub(crate) async fn read_u64<S: KvStore>(store: &S, key: &str) -> u64 {
    let Some(raw) = read_or_absent(store, key).await else {
        return 0;
    };
    match raw.trim().parse::<u64>() {
        Ok(n) => n,
        Err(_) => {
            warn!(key, value = %raw, "stored counter is not a number, using 0");
            0
        }
    }
}

/// Returns `~/.config/pause[-dev]/` based on PAUSE_ENV.
///
/// Set PAUSE_ENV=dev to use development data directory, or PAUSE_HOME to
/// point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("PAUSE_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("PAUSE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pause-dev")
            } else {
                base_dir.join("pause")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
