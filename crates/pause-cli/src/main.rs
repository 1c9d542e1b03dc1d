use clap::{Parser, Subcommand};
use pause_core::stats::MAX_WINDOW_DAYS;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pause", version, about = "Pause: take a breath, keep a streak")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session and manage its length
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Current streak
    Streak {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// All-time totals
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sessions per day for the most recent days
    Activity {
        /// Number of days, ending today (defaults to activity.window_days)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WINDOW_DAYS)))]
        days: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Background theme
    Theme {
        #[command(subcommand)]
        action: commands::theme::ThemeAction,
    },
    /// Print an affirmation
    Affirm {
        #[command(subcommand)]
        action: Option<commands::affirm::AffirmAction>,
        /// Language code (defaults to affirmations.language, then the locale)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PAUSE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action).await,
        Commands::Streak { json } => commands::streak::run(json).await,
        Commands::Stats { json } => commands::stats::run(json).await,
        Commands::Activity { days, json } => commands::activity::run(days, json).await,
        Commands::Theme { action } => commands::theme::run(action).await,
        Commands::Affirm { action, lang } => commands::affirm::run(action, lang),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
