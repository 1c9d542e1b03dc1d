use std::sync::Arc;

use clap::Subcommand;
use pause_core::{Config, Event, SessionOrchestrator, SystemClock};

use super::CmdResult;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session and wait for it (Ctrl-C stops it early)
    Start {
        /// Session length in seconds; must be one of timer.durations
        #[arg(long)]
        duration: Option<u64>,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Show or set the default session length
    Duration {
        /// New length in seconds
        secs: Option<u64>,
    },
    /// Switch the default session length to the next preset
    Cycle,
}

pub async fn run(action: SessionAction) -> CmdResult {
    match action {
        SessionAction::Start { duration, json } => start(duration, json).await,
        SessionAction::Duration { secs } => {
            let mut config = Config::load()?;
            match secs {
                Some(secs) => {
                    config.set("timer.default_duration_secs", &secs.to_string())?;
                    config.save()?;
                    println!("default duration: {}", format_secs(secs));
                }
                None => println!("{}", config.timer.default_duration_secs),
            }
            Ok(())
        }
        SessionAction::Cycle => {
            let mut config = Config::load()?;
            let mut timer = pause_core::SessionTimer::with_presets(
                config.timer.durations.clone(),
                config.timer.default_duration_secs,
            )?;
            if let Some(Event::DurationChanged { duration_secs, .. }) = timer.cycle_duration() {
                config.timer.default_duration_secs = duration_secs;
                config.save()?;
            }
            println!(
                "default duration: {}",
                format_secs(config.timer.default_duration_secs)
            );
            Ok(())
        }
    }
}

async fn start(duration: Option<u64>, json: bool) -> CmdResult {
    let config = Config::load()?;
    let store = super::open_store()?;
    let (mut session, mut events) =
        SessionOrchestrator::load(store, Arc::new(SystemClock), &config).await?;

    if let Some(secs) = duration {
        session.set_duration(secs)?;
    }
    // Nothing is running yet in a fresh process.
    session.begin_session().await;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(&event, json)?;
                if event.is_terminal() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                // The stop event arrives on the channel like any other.
                session.end_session();
            }
        }
    }

    let summary = session.summary();
    let catalog = super::affirmation_catalog(&config);
    let language = super::affirmation_language(&catalog, &config, None);
    let affirmation = catalog.random([language]);

    if json {
        let line = serde_json::json!({
            "type": "summary",
            "streak": summary.streak,
            "stats": summary.stats,
            "today_count": summary.today_count,
            "today_intensity": summary.today_intensity,
            "affirmation": affirmation,
        });
        println!("{line}");
    } else {
        println!();
        println!("{affirmation}");
        println!(
            "streak {} | today {} | total {} sessions, {}",
            summary.streak,
            summary.today_count,
            summary.stats.total_sessions,
            format_secs(summary.stats.total_duration_secs)
        );
    }
    Ok(())
}

fn print_event(event: &Event, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::TimerStarted { duration_secs, .. } => {
            println!("breathe... {}", format_secs(*duration_secs));
        }
        Event::TimerTicked { remaining_secs, .. } => {
            println!("{}", format_secs(*remaining_secs));
        }
        Event::TimerCompleted { .. } => println!("done"),
        Event::TimerStopped { remaining_secs, .. } => {
            println!("stopped with {} left", format_secs(*remaining_secs));
        }
        Event::DurationChanged { duration_secs, .. } => {
            println!("duration: {}", format_secs(*duration_secs));
        }
        Event::StateSnapshot { .. } => {}
    }
    Ok(())
}

/// `90` -> `1:30`
pub fn format_secs(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
