//! Theme preference, stored as a plain string under [`THEME_STORAGE_KEY`]

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::ports::storage::{KeyValueStore, StoreError};

pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the device setting
    #[default]
    System,
}

impl Theme {
    /// Resolve to a concrete appearance
    pub fn is_dark(self, system_is_dark: bool) -> bool {
        match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => system_is_dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// Stored preference; anything unreadable or unknown means `System`
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(THEME_STORAGE_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Unknown stored theme '{}', using system", raw.trim());
                Theme::System
            }),
            Ok(None) => Theme::System,
            Err(e) => {
                tracing::warn!("Failed to load theme preference: {}", e);
                Theme::System
            }
        }
    }

    pub fn save(self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(THEME_STORAGE_KEY, self.as_str())?;
        tracing::info!("Theme set to {}", self);
        Ok(())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme '{}' (expected light, dark or system)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStore;
    use crate::ports::mocks::ReadOnlyStore;

    #[test]
    fn test_is_dark() {
        assert!(Theme::Dark.is_dark(false));
        assert!(!Theme::Light.is_dark(true));
        assert!(Theme::System.is_dark(true));
        assert!(!Theme::System.is_dark(false));
    }

    #[test]
    fn test_parse() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!(" light\n".parse::<Theme>(), Ok(Theme::Light));
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let store = MemoryStore::new();
        assert_eq!(Theme::load(&store), Theme::System);

        Theme::Dark.save(&store).unwrap();
        assert_eq!(store.get(THEME_STORAGE_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(Theme::load(&store), Theme::Dark);
    }

    #[test]
    fn test_unknown_value_falls_back() {
        let store = ReadOnlyStore::new().with_value(THEME_STORAGE_KEY, "neon");
        assert_eq!(Theme::load(&store), Theme::System);
        assert!(Theme::Light.save(&store).is_err());
    }
}
