use std::path::PathBuf;
use eyre::{Result, eyre};
use log::{info, warn};
use rune_cfg::RuneConfig;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Styling variables for one theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub bg: String,
    pub accent: String,
    pub secondary: String,
    pub muted: String,
}

impl Palette {
    pub fn light() -> Self {
        Self {
            bg: "#f6fbff".to_string(),
            accent: "#2563eb".to_string(),
            secondary: "#059669".to_string(),
            muted: "#64748b".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#0b1220".to_string(),
            accent: "#60a5fa".to_string(),
            secondary: "#34d399".to_string(),
            muted: "#94a3b8".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Form relay endpoint. Without one, submissions are simulated.
    pub endpoint: Option<String>,
    pub recipient: String,
    pub subject: String,
    pub latency_ms: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            recipient: "hello@example.com".to_string(),
            subject: "Portfolio Contact".to_string(),
            latency_ms: 900,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub back_to_top_offset: f64,
    pub fade_threshold: f64,
    pub skill_threshold: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            back_to_top_offset: 300.0,
            fade_threshold: 0.1,
            skill_threshold: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolioConfig {
    pub light: Palette,
    pub dark: Palette,
    pub contact: ContactConfig,
    pub page: PageConfig,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            light: Palette::light(),
            dark: Palette::dark(),
            contact: ContactConfig::default(),
            page: PageConfig::default(),
        }
    }
}

impl FolioConfig {
    pub fn palette(&self, theme: Theme) -> &Palette {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }
}

/// Expands ~ to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn load_palette(config: &RuneConfig, section: &str, defaults: Palette) -> Palette {
    Palette {
        bg: config.get_or(&format!("{}.bg", section), defaults.bg),
        accent: config.get_or(&format!("{}.accent", section), defaults.accent),
        secondary: config.get_or(&format!("{}.secondary", section), defaults.secondary),
        muted: config.get_or(&format!("{}.muted", section), defaults.muted),
    }
}

pub fn load_config(path: &str) -> Result<FolioConfig> {
    let expanded_path = expand_tilde(path);
    let path_str = expanded_path
        .to_str()
        .ok_or_else(|| eyre!("Config path is not valid UTF-8: {}", expanded_path.display()))?;

    let config = RuneConfig::from_file(path_str)
        .map_err(|e| eyre!("Failed to load config: {}", e))?;

    let contact_defaults = ContactConfig::default();
    let latency_ms: i32 = config.get_or("contact.latency_ms", contact_defaults.latency_ms as i32);
    let contact = ContactConfig {
        endpoint: config
            .get::<String>("contact.endpoint")
            .ok()
            .filter(|e| !e.trim().is_empty()),
        recipient: config.get_or("contact.recipient", contact_defaults.recipient),
        subject: config.get_or("contact.subject", contact_defaults.subject),
        latency_ms: latency_ms.max(0) as u64,
    };

    let page_defaults = PageConfig::default();
    let page = PageConfig {
        back_to_top_offset: config.get_or("page.back_to_top_offset", page_defaults.back_to_top_offset),
        fade_threshold: config.get_or("page.fade_threshold", page_defaults.fade_threshold),
        skill_threshold: config.get_or("page.skill_threshold", page_defaults.skill_threshold),
    };

    info!("Loaded config from {}", expanded_path.display());

    Ok(FolioConfig {
        light: load_palette(&config, "light", Palette::light()),
        dark: load_palette(&config, "dark", Palette::dark()),
        contact,
        page,
    })
}

pub fn find_config() -> Option<PathBuf> {
    if let Some(home) = dirs::config_dir() {
        let user_config = home.join("folio").join("folio.rune");
        if user_config.exists() {
            return Some(user_config);
        }
    }
    let default_config = PathBuf::from("/usr/share/doc/folio/folio.rune");
    if default_config.exists() {
        return Some(default_config);
    }
    None
}

pub fn load_config_or_default() -> FolioConfig {
    match find_config() {
        Some(path) => match load_config(&path.to_string_lossy()) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Configuration error: {}. Using defaults.", err);
                FolioConfig::default()
            }
        },
        None => FolioConfig::default(),
    }
}

/// Explicit paths must load; the search path falls back to defaults.
pub fn resolve_config(path: Option<&str>) -> Result<FolioConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(load_config_or_default()),
    }
}

pub fn get_config_path() -> PathBuf {
    find_config().unwrap_or_else(|| {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("folio").join("folio.rune")
        } else {
            PathBuf::from("folio.rune")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palettes_use_site_colors() {
        let config = FolioConfig::default();
        assert_eq!(config.palette(Theme::Light).bg, "#f6fbff");
        assert_eq!(config.palette(Theme::Light).accent, "#2563eb");
        assert_eq!(config.palette(Theme::Dark), &Palette::dark());
    }

    #[test]
    fn defaults_simulate_contact() {
        let contact = ContactConfig::default();
        assert!(contact.endpoint.is_none());
        assert_eq!(contact.latency_ms, 900);
    }

    #[test]
    fn tilde_is_expanded_only_as_prefix() {
        assert_eq!(expand_tilde("/etc/folio.rune"), PathBuf::from("/etc/folio.rune"));
        assert_eq!(expand_tilde("a/~/b"), PathBuf::from("a/~/b"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/folio.rune"), home.join("folio.rune"));
        }
    }

    #[test]
    fn loads_sections_from_rune_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.rune");
        std::fs::write(
            &path,
            r##"# site colours
light:
  bg "#ffffff"
  accent "#123"
end

contact:
  endpoint "https://relay.example.com/f/abc"
  recipient "me@example.com"
  latency_ms 50
end

page:
  back_to_top_offset 500
  fade_threshold 0.2
end
"##,
        )
        .unwrap();

        let config = load_config(&path.to_string_lossy()).unwrap();
        assert_eq!(config.light.bg, "#ffffff");
        assert_eq!(config.light.accent, "#123");
        assert_eq!(config.light.muted, Palette::light().muted);
        assert_eq!(config.dark, Palette::dark());

        assert_eq!(config.contact.endpoint.as_deref(), Some("https://relay.example.com/f/abc"));
        assert_eq!(config.contact.recipient, "me@example.com");
        assert_eq!(config.contact.subject, "Portfolio Contact");
        assert_eq!(config.contact.latency_ms, 50);

        assert_eq!(config.page.back_to_top_offset, 500.0);
        assert_eq!(config.page.fade_threshold, 0.2);
        assert_eq!(config.page.skill_threshold, 0.25);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.rune");
        assert!(resolve_config(Some(&missing.to_string_lossy())).is_err());
    }
}
