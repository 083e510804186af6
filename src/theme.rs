use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use eyre::{Result, WrapErr, eyre};
use log::debug;
use serde::{Deserialize, Serialize};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "🌞",
            Theme::Dark => "🌙",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(eyre!("Unknown theme: {}", other)),
        }
    }
}

/// A saved preference wins over the system preference.
pub fn resolve(saved: Option<Theme>, system_prefers_dark: bool) -> Theme {
    saved.unwrap_or(if system_prefers_dark { Theme::Dark } else { Theme::Light })
}

/// New theme after a system preference change, if it applies.
pub fn on_system_change(saved: Option<Theme>, prefers_dark: bool) -> Option<Theme> {
    match saved {
        Some(_) => None,
        None => Some(resolve(None, prefers_dark)),
    }
}

/// Persistent key-value storage for user preferences.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Stored theme, ignoring values that do not parse.
pub fn saved_theme(store: &impl KeyValueStore) -> Option<Theme> {
    store.get(THEME_KEY).and_then(|v| v.parse().ok())
}

pub fn save_theme(store: &mut impl KeyValueStore, theme: Theme) -> Result<()> {
    store.set(THEME_KEY, theme.as_str())
}

/// Flip the current theme and persist the result.
pub fn toggle_theme(
    store: &mut impl KeyValueStore,
    prefs: &impl PreferenceSource,
) -> Result<Theme> {
    let next = resolve(saved_theme(store), prefs.prefers_dark()).toggle();
    save_theme(store, next)?;
    Ok(next)
}

/// `key=value` lines in a file.
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => parse_entries(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("Failed to read {}", path.display()));
            }
        };
        Ok(Self { path, entries })
    }

    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("folio").join("state"))
            .unwrap_or_else(|| PathBuf::from(".folio-state"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        fs::write(&self.path, out)
            .wrap_err_with(|| format!("Failed to write {}", self.path.display()))?;
        debug!("Wrote state to {}", self.path.display());
        Ok(())
    }
}

fn parse_entries(contents: &str) -> BTreeMap<String, String> {
    contents
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Source of the system's light/dark preference.
pub trait PreferenceSource {
    fn prefers_dark(&self) -> bool;
}

/// Reads `FOLIO_COLOR_SCHEME`, then the terminal's `COLORFGBG`.
pub struct EnvPreference;

impl EnvPreference {
    fn from_vars(scheme: Option<&str>, colorfgbg: Option<&str>) -> bool {
        if let Some(scheme) = scheme {
            match scheme.trim() {
                "dark" => return true,
                "light" => return false,
                _ => {}
            }
        }
        // "fg;bg" or "fg;default;bg"
        colorfgbg
            .and_then(|v| v.rsplit(';').next())
            .and_then(|bg| bg.parse::<u8>().ok())
            .is_some_and(|bg| bg <= 6 || bg == 8)
    }
}

impl PreferenceSource for EnvPreference {
    fn prefers_dark(&self) -> bool {
        let scheme = std::env::var("FOLIO_COLOR_SCHEME").ok();
        let colorfgbg = std::env::var("COLORFGBG").ok();
        Self::from_vars(scheme.as_deref(), colorfgbg.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(bool);

    impl PreferenceSource for Fixed {
        fn prefers_dark(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn saved_preference_wins() {
        assert_eq!(resolve(Some(Theme::Light), true), Theme::Light);
        assert_eq!(resolve(Some(Theme::Dark), false), Theme::Dark);
        assert_eq!(resolve(None, true), Theme::Dark);
        assert_eq!(resolve(None, false), Theme::Light);
    }

    #[test]
    fn system_change_ignored_when_saved() {
        assert_eq!(on_system_change(Some(Theme::Light), true), None);
        assert_eq!(on_system_change(None, true), Some(Theme::Dark));
        assert_eq!(on_system_change(None, false), Some(Theme::Light));
    }

    #[test]
    fn parses_and_displays() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" light\n".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.to_string(), "dark");
        assert_eq!(Theme::Light.icon(), "🌞");
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state");

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(saved_theme(&store), None);

        let next = toggle_theme(&mut store, &Fixed(false)).unwrap();
        assert_eq!(next, Theme::Dark);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(saved_theme(&reopened), Some(Theme::Dark));
        assert_eq!(fs::read_to_string(&path).unwrap(), "theme=dark\n");
    }

    #[test]
    fn remove_clears_saved_theme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        let mut store = FileStore::open(&path).unwrap();
        save_theme(&mut store, Theme::Light).unwrap();
        store.remove(THEME_KEY).unwrap();
        assert_eq!(saved_theme(&FileStore::open(&path).unwrap()), None);
    }

    #[test]
    fn garbage_theme_value_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        fs::write(&path, "theme=neon\nother = 1\nnoise\n").unwrap();
        let store = FileStore::open(&path).unwrap();
        assert_eq!(saved_theme(&store), None);
        assert_eq!(store.get("other").as_deref(), Some("1"));
    }

    #[test]
    fn env_preference() {
        assert!(EnvPreference::from_vars(Some("dark"), Some("0;15")));
        assert!(!EnvPreference::from_vars(Some("light"), Some("15;0")));
        assert!(EnvPreference::from_vars(None, Some("15;0")));
        assert!(EnvPreference::from_vars(None, Some("15;default;8")));
        assert!(!EnvPreference::from_vars(None, Some("0;15")));
        assert!(!EnvPreference::from_vars(Some("auto"), None));
    }
}
