pub mod activity;
pub mod affirm;
pub mod config;
pub mod session;
pub mod stats;
pub mod streak;
pub mod theme;

use std::sync::Arc;

use pause_core::{AffirmationCatalog, Config, Database};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_store() -> Result<Arc<Database>, pause_core::CoreError> {
    Ok(Arc::new(Database::open()?))
}

pub fn affirmation_catalog(config: &Config) -> AffirmationCatalog {
    match config.affirmation_dir() {
        Some(dir) => AffirmationCatalog::from_dir(&dir),
        None => AffirmationCatalog::bundled(),
    }
}

/// Language to show: explicit flag, then config, then the environment locale.
pub fn affirmation_language(
    catalog: &AffirmationCatalog,
    config: &Config,
    lang: Option<&str>,
) -> &'static str {
    let explicit = lang
        .filter(|l| !l.is_empty())
        .or_else(|| Some(config.affirmations.language.as_str()).filter(|l| !l.is_empty()));
    match explicit {
        Some(code) => catalog.detect_language([code]),
        None => catalog.detect_language(pause_core::affirmations::locales_from_env()),
    }
}
