//! Localized affirmations shown after a pause.
//!
//! A list is bundled for every supported language; a language whose data is
//! missing or unusable falls back to English. A directory of `<code>.json`
//! files (`{"affirmations": [...]}`) can override the bundled lists.

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, warn};

pub const SUPPORTED_LANGUAGES: [&str; 18] = [
    "en", "es", "fr", "de", "pt", "it", "ja", "ko", "zh", "ar", "hi", "ru", "nl", "pl", "sv", "no",
    "da", "fi",
];

pub const FALLBACK_LANGUAGE: &str = "en";

/// Used only when even the English list is unavailable.
pub const LAST_RESORT: &str = "You are enough.";

const BUNDLED: [(&str, &str); 18] = [
    ("en", include_str!("../assets/affirmations/en.json")),
    ("es", include_str!("../assets/affirmations/es.json")),
    ("fr", include_str!("../assets/affirmations/fr.json")),
    ("de", include_str!("../assets/affirmations/de.json")),
    ("pt", include_str!("../assets/affirmations/pt.json")),
    ("it", include_str!("../assets/affirmations/it.json")),
    ("ja", include_str!("../assets/affirmations/ja.json")),
    ("ko", include_str!("../assets/affirmations/ko.json")),
    ("zh", include_str!("../assets/affirmations/zh.json")),
    ("ar", include_str!("../assets/affirmations/ar.json")),
    ("hi", include_str!("../assets/affirmations/hi.json")),
    ("ru", include_str!("../assets/affirmations/ru.json")),
    ("nl", include_str!("../assets/affirmations/nl.json")),
    ("pl", include_str!("../assets/affirmations/pl.json")),
    ("sv", include_str!("../assets/affirmations/sv.json")),
    ("no", include_str!("../assets/affirmations/no.json")),
    ("da", include_str!("../assets/affirmations/da.json")),
    ("fi", include_str!("../assets/affirmations/fi.json")),
];

#[derive(Deserialize)]
struct AffirmationFile {
    affirmations: Vec<String>,
}

fn parse_list(code: &str, raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<AffirmationFile>(raw) {
        Ok(file) => {
            let list: Vec<String> = file
                .affirmations
                .into_iter()
                .filter(|a| !a.trim().is_empty())
                .collect();
            if list.is_empty() {
                warn!(language = code, "affirmation list is empty");
                None
            } else {
                Some(list)
            }
        }
        Err(e) => {
            warn!(language = code, error = %e, "invalid affirmation data");
            None
        }
    }
}

/// Primary language subtag of a locale string such as `es-MX`, `pt_BR.UTF-8`
/// or `de_DE@euro`, lowercased.
pub fn primary_subtag(locale: &str) -> String {
    locale
        .split(['-', '_', '.', '@'])
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Locale candidates from `LANGUAGE`, `LC_ALL`, `LC_MESSAGES` and `LANG`, in
/// that order.
pub fn locales_from_env() -> Vec<String> {
    let mut locales = Vec::new();
    if let Ok(list) = std::env::var("LANGUAGE") {
        locales.extend(list.split(':').filter(|s| !s.is_empty()).map(String::from));
    }
    for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                locales.push(value);
            }
        }
    }
    locales
}

#[derive(Debug, Clone)]
pub struct AffirmationCatalog {
    lists: HashMap<&'static str, Vec<String>>,
    last_resort: Vec<String>,
}

impl AffirmationCatalog {
    /// Catalog holding only the bundled lists.
    pub fn bundled() -> Self {
        let lists = BUNDLED
            .iter()
            .filter_map(|(code, raw)| parse_list(code, raw).map(|list| (*code, list)))
            .collect();
        Self::from_lists(lists)
    }

    /// Bundled lists overridden by `<dir>/<code>.json` where present.
    pub fn from_dir(dir: &Path) -> Self {
        let mut catalog = Self::bundled();
        for code in SUPPORTED_LANGUAGES {
            let path = dir.join(format!("{code}.json"));
            let Ok(raw) = std::fs::read_to_string(&path) else {
                continue;
            };
            if let Some(list) = parse_list(code, &raw) {
                debug!(language = code, count = list.len(), "loaded affirmations from disk");
                catalog.lists.insert(code, list);
            }
        }
        catalog
    }

    fn from_lists(lists: HashMap<&'static str, Vec<String>>) -> Self {
        Self {
            lists,
            last_resort: vec![LAST_RESORT.to_string()],
        }
    }

    pub fn supported_languages(&self) -> &'static [&'static str] {
        &SUPPORTED_LANGUAGES
    }

    pub fn is_supported(&self, code: &str) -> bool {
        normalize(code).is_some()
    }

    /// The first locale whose primary subtag is supported, else English.
    pub fn detect_language<I, L>(&self, locales: I) -> &'static str
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        locales
            .into_iter()
            .find_map(|locale| normalize(&primary_subtag(locale.as_ref())))
            .unwrap_or(FALLBACK_LANGUAGE)
    }

    /// Affirmations for `code`, falling back to English when the language is
    /// unsupported or has no data.
    pub fn affirmations_for(&self, code: &str) -> &[String] {
        let code = normalize(code).unwrap_or(FALLBACK_LANGUAGE);
        if let Some(list) = self.lists.get(code) {
            return list;
        }
        if code != FALLBACK_LANGUAGE {
            debug!(language = code, "no affirmations bundled, using fallback");
        }
        self.lists
            .get(FALLBACK_LANGUAGE)
            .map(Vec::as_slice)
            .unwrap_or(&self.last_resort)
    }

    pub fn random_for<R: Rng + ?Sized>(&self, code: &str, rng: &mut R) -> &str {
        self.affirmations_for(code)
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(LAST_RESORT)
    }

    /// Random affirmation in the language detected from `locales`.
    pub fn random<I, L>(&self, locales: I) -> &str
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let code = self.detect_language(locales);
        self.random_for(code, &mut rand::thread_rng())
    }
}

impl Default for AffirmationCatalog {
    fn default() -> Self {
        Self::bundled()
    }
}

fn normalize(code: &str) -> Option<&'static str> {
    let lower = code.trim().to_lowercase();
    SUPPORTED_LANGUAGES.iter().copied().find(|c| *c == lower)
}
