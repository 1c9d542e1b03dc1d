use pause_core::StatsAccumulator;

use super::session::format_secs;
use super::CmdResult;

pub async fn run(json: bool) -> CmdResult {
    let store = super::open_store()?;
    let stats = StatsAccumulator::load(store).await.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("sessions: {}", stats.total_sessions);
        println!("time:     {}", format_secs(stats.total_duration_secs));
    }
    Ok(())
}
