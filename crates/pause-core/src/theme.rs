//! Background themes.
//!
//! The catalog is built once at startup and handed to [`ThemeManager`].
//! The last catalog entry is the "stealth" theme: reachable only by an
//! explicit jump, never by rotating left or right.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, ValidationError};
use crate::storage::{keys, read_or_absent, KvStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub gradient: String,
}

impl Theme {
    fn new(name: &str, gradient: &str) -> Self {
        Self {
            name: name.into(),
            gradient: gradient.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Stealth,
}

#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes: Vec<Theme>,
}

impl ThemeCatalog {
    /// # Errors
    /// Returns an error for fewer than two themes (one regular, one stealth).
    pub fn new(themes: Vec<Theme>) -> Result<Self, ValidationError> {
        if themes.len() < 2 {
            return Err(ValidationError::InvalidValue {
                field: "themes".into(),
                message: "need at least one regular theme and a stealth theme".into(),
            });
        }
        Ok(Self { themes })
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn find(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    pub fn stealth(&self) -> &Theme {
        &self.themes[self.themes.len() - 1]
    }

    fn rotation_len(&self) -> usize {
        self.themes.len() - 1
    }
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self {
            themes: vec![
                Theme::new("Default", "linear-gradient(135deg,#4C90FF 0%,#65F9D5 100%)"),
                Theme::new("Sunset", "linear-gradient(135deg,#FF8C00 0%,#F0E68C 100%)"),
                Theme::new("Ocean", "linear-gradient(135deg,#1E90FF 0%,#00BFFF 100%)"),
                Theme::new("Forest", "linear-gradient(135deg,#228B22 0%,#32CD32 100%)"),
                Theme::new("Candy", "linear-gradient(135deg,#FF69B4 0%,#FFC0CB 100%)"),
                Theme::new("Stealth", "linear-gradient(135deg,#FFFFFF 0%,#CCCCCC 100%)"),
            ],
        }
    }
}

pub struct ThemeManager<S> {
    store: Arc<S>,
    catalog: Arc<ThemeCatalog>,
    index: usize,
}

impl<S: KvStore> ThemeManager<S> {
    /// Unknown or missing stored names select the first theme.
    pub async fn load(store: Arc<S>, catalog: Arc<ThemeCatalog>) -> Self {
        let index = read_or_absent(&*store, keys::THEME)
            .await
            .and_then(|name| catalog.themes.iter().position(|t| t.name == name))
            .unwrap_or(0);
        Self {
            store,
            catalog,
            index,
        }
    }

    pub fn current(&self) -> &Theme {
        &self.catalog.themes[self.index]
    }

    /// Rotate or jump to stealth, then persist the new name.
    ///
    /// Rotation is modulo the regular themes, so leaving stealth to the right
    /// lands on the second theme and to the left on the last regular one.
    ///
    /// # Errors
    /// Returns the write error; the selection still changes in memory.
    pub async fn change(&mut self, direction: Direction) -> Result<&Theme, StoreError> {
        let n = self.catalog.rotation_len();
        self.index = match direction {
            Direction::Stealth => self.catalog.themes.len() - 1,
            Direction::Right => (self.index + 1) % n,
            Direction::Left => (self.index + n - 1) % n,
        };
        let name = self.catalog.themes[self.index].name.clone();
        debug!(theme = %name, ?direction, "theme changed");
        self.store.set(keys::THEME, &name).await?;
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    async fn manager_with(stored: Option<&str>) -> (ThemeManager<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(match stored {
            Some(name) => MemoryStore::with_entries([(keys::THEME, name)]),
            None => MemoryStore::new(),
        });
        let manager = ThemeManager::load(store.clone(), Arc::new(ThemeCatalog::default())).await;
        (manager, store)
    }

    #[tokio::test]
    async fn defaults_to_first_theme() {
        let (m, _) = manager_with(None).await;
        assert_eq!(m.current().name, "Default");
        let (m, _) = manager_with(Some("Neon")).await;
        assert_eq!(m.current().name, "Default");
        let (m, _) = manager_with(Some("Ocean")).await;
        assert_eq!(m.current().name, "Ocean");
    }

    #[tokio::test]
    async fn rotation_skips_stealth() {
        let (mut m, store) = manager_with(Some("Candy")).await;
        assert_eq!(m.change(Direction::Right).await.unwrap().name, "Default");
        assert_eq!(m.change(Direction::Left).await.unwrap().name, "Candy");
        assert_eq!(store.snapshot(keys::THEME).as_deref(), Some("Candy"));
    }

    #[tokio::test]
    async fn leaving_stealth() {
        let (mut m, _) = manager_with(Some("Stealth")).await;
        assert_eq!(m.change(Direction::Right).await.unwrap().name, "Sunset");

        m.change(Direction::Stealth).await.unwrap();
        assert_eq!(m.change(Direction::Left).await.unwrap().name, "Candy");
    }

    #[test]
    fn catalog_needs_two_themes() {
        assert!(ThemeCatalog::new(vec![Theme::new("Only", "#000")]).is_err());
        let catalog = ThemeCatalog::default();
        assert_eq!(catalog.stealth().name, "Stealth");
        assert!(catalog.find("Forest").is_some());
    }
}
