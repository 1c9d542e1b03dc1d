use std::sync::Arc;

use pause_core::stats::MAX_INTENSITY;
use pause_core::{Config, DailyActivityLedger, DayActivity, SystemClock};

use super::CmdResult;

const SHADES: [char; MAX_INTENSITY as usize + 1] = ['.', '░', '▒', '▓', '█'];

pub async fn run(days: Option<u32>, json: bool) -> CmdResult {
    let config = Config::load()?;
    let days = days.unwrap_or(config.activity.window_days);
    let store = super::open_store()?;
    let ledger = DailyActivityLedger::load(store, Arc::new(SystemClock)).await;
    let window = ledger.recent_window(days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&window)?);
    } else {
        for line in render(&window) {
            println!("{line}");
        }
    }
    Ok(())
}

fn render(window: &[DayActivity]) -> Vec<String> {
    window
        .iter()
        .map(|day| {
            let shade = SHADES[usize::from(day.intensity.min(MAX_INTENSITY))];
            format!("{} {shade} {}", day.date, day.count)
        })
        .collect()
}
