use std::sync::Arc;

use pause_core::{Config, StreakTracker, SystemClock};

use super::CmdResult;

pub async fn run(json: bool) -> CmdResult {
    let config = Config::load()?;
    let store = super::open_store()?;
    let tracker =
        StreakTracker::load_with_window(store, Arc::new(SystemClock), config.streak_window_ms())
            .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&tracker.record())?);
    } else {
        println!("{}", tracker.streak());
    }
    Ok(())
}
