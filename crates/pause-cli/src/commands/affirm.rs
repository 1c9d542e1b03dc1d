use clap::Subcommand;
use pause_core::affirmations::SUPPORTED_LANGUAGES;
use pause_core::Config;

use super::CmdResult;

#[derive(Subcommand)]
pub enum AffirmAction {
    /// List supported language codes
    Languages,
}

pub fn run(action: Option<AffirmAction>, lang: Option<String>) -> CmdResult {
    if let Some(AffirmAction::Languages) = action {
        println!("{}", SUPPORTED_LANGUAGES.join(" "));
        return Ok(());
    }

    let config = Config::load()?;
    let catalog = super::affirmation_catalog(&config);
    if let Some(code) = lang.as_deref() {
        if !catalog.is_supported(code) {
            tracing::warn!(language = code, "unsupported language, using fallback");
        }
    }
    let language = super::affirmation_language(&catalog, &config, lang.as_deref());
    println!("{}", catalog.random([language]));
    Ok(())
}
