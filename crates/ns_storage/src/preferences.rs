use ns_core::Result;

use crate::KeyValueStore;

pub const THEME_KEY: &str = "newssphere_theme";
pub const COUNTRY_KEY: &str = "newssphere_country";
pub const DEFAULT_COUNTRY: &str = "us";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything but `dark` is light.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("dark") {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Theme and country choices. Values are stored as plain strings.
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn theme(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::parse(&raw),
            _ => Theme::default(),
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let theme = self.theme().toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    pub fn country(&self) -> String {
        match self.store.get(COUNTRY_KEY) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw.trim().to_lowercase(),
            _ => DEFAULT_COUNTRY.to_string(),
        }
    }

    /// A blank selection falls back to the default country.
    pub fn set_country(&self, country: &str) -> Result<String> {
        let country = match country.trim() {
            "" => DEFAULT_COUNTRY.to_string(),
            other => other.to_lowercase(),
        };
        self.store.set(COUNTRY_KEY, &country)?;
        Ok(country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::new(MemoryStore::new());
        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.country(), "us");
    }

    #[test]
    fn test_theme_toggle_persists() {
        let store = MemoryStore::new();
        let prefs = Preferences::new(&store);
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(Theme::parse("purple"), Theme::Light);
    }

    #[test]
    fn test_country() {
        let prefs = Preferences::new(MemoryStore::new());
        assert_eq!(prefs.set_country(" GB ").unwrap(), "gb");
        assert_eq!(prefs.country(), "gb");
        assert_eq!(prefs.set_country("").unwrap(), "us");
    }
}
