use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::colour;
use crate::config::Palette;

pub const BG: &str = "--color-bg";
pub const ACCENT: &str = "--color-accent";
pub const SECONDARY: &str = "--color-secondary";
pub const MUTED: &str = "--color-muted";

const BG_FALLBACK: &str = "#f6fbff";
const ACCENT_FALLBACK: &str = "#2563eb";

/// Named styling variables, e.g. `--color-bg`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleVars {
    vars: BTreeMap<String, String>,
}

impl StyleVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_palette(palette: &Palette) -> Self {
        let mut vars = Self::new();
        vars.set(BG, &palette.bg);
        vars.set(ACCENT, &palette.accent);
        vars.set(SECONDARY, &palette.secondary);
        vars.set(MUTED, &palette.muted);
        vars
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    /// Trimmed value, or `fallback` when unset or blank.
    fn value_or<'a>(&'a self, name: &str, fallback: &'a str) -> &'a str {
        match self.get(name).map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => fallback,
        }
    }

    /// Refresh `--color-bg-rgb` and `--color-accent-rgb` for translucent
    /// compositing. A source that is not a decodable hex literal leaves
    /// its derived variable as it was.
    pub fn update_rgb_vars(&mut self) {
        for (name, fallback) in [(BG, BG_FALLBACK), (ACCENT, ACCENT_FALLBACK)] {
            let value = self.value_or(name, fallback);
            if !value.starts_with('#') {
                continue;
            }
            match colour::rgb_string(value) {
                Some(rgb) => {
                    let derived = format!("{}-rgb", name);
                    self.set(&derived, &rgb);
                }
                None => debug!("Skipping {}: unsupported colour {:?}", name, value),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Renders a `:root` block.
impl fmt::Display for StyleVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ":root {{")?;
        for (name, value) in self.iter() {
            writeln!(f, "  {}: {};", name, value)?;
        }
        write!(f, "}}")
    }
}
