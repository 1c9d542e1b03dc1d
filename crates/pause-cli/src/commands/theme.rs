use std::sync::Arc;

use clap::Subcommand;
use pause_core::{Direction, Theme, ThemeCatalog, ThemeManager};

use super::CmdResult;

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Show the current theme
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rotate to the next theme
    Next,
    /// Rotate to the previous theme
    Prev,
    /// Jump to the stealth theme
    Stealth,
    /// List every theme
    List,
}

pub async fn run(action: ThemeAction) -> CmdResult {
    let store = super::open_store()?;
    let catalog = Arc::new(ThemeCatalog::default());
    let mut manager = ThemeManager::load(store, catalog.clone()).await;

    let direction = match action {
        ThemeAction::Show { json } => {
            let theme = manager.current();
            if json {
                println!("{}", serde_json::to_string_pretty(theme)?);
            } else {
                print_theme(theme);
            }
            return Ok(());
        }
        ThemeAction::List => {
            let current = manager.current().name.clone();
            for theme in catalog.themes() {
                let marker = if theme.name == current { "*" } else { " " };
                println!("{marker} {}", theme.name);
            }
            return Ok(());
        }
        ThemeAction::Next => Direction::Right,
        ThemeAction::Prev => Direction::Left,
        ThemeAction::Stealth => Direction::Stealth,
    };

    print_theme(manager.change(direction).await?);
    Ok(())
}

fn print_theme(theme: &Theme) {
    println!("{}  {}", theme.name, theme.gradient);
}
