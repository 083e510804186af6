use std::process::ExitCode;
use std::time::Duration;

use eyre::Result;
use log::{debug, info};

use crate::args::{Args, Command, ThemeAction};
use crate::colour;
use crate::config::{self, FolioConfig, expand_tilde};
use crate::contact::{self, ContactForm, HttpRelay, Relay, SimulatedRelay};
use crate::theme::{self, EnvPreference, FileStore, KeyValueStore, PreferenceSource, Theme};
use crate::vars::StyleVars;

pub fn run(args: Args) -> Result<ExitCode> {
    match args.command.clone() {
        Command::Rgb { hex } => Ok(rgb(&hex)),
        Command::Vars { theme, watch } => vars(&args, theme, watch),
        Command::Theme { action } => theme_command(&args, action.unwrap_or(ThemeAction::Show)),
        Command::Contact { name, email, message, mailto } => {
            contact_command(&args, ContactForm::new(name, email, message), mailto)
        }
    }
}

fn rgb_line(hex: &str) -> Option<String> {
    colour::rgb_string(hex.trim())
}

/// Unsupported input prints nothing.
fn rgb(hex: &str) -> ExitCode {
    match rgb_line(hex) {
        Some(rgb) => {
            println!("{}", rgb);
            ExitCode::SUCCESS
        }
        None => {
            debug!("Unsupported colour: {:?}", hex);
            ExitCode::FAILURE
        }
    }
}

fn open_store(args: &Args) -> Result<FileStore> {
    let path = args
        .state
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(FileStore::default_path);
    FileStore::open(path)
}

fn active_theme(store: &impl KeyValueStore) -> Theme {
    theme::resolve(theme::saved_theme(store), EnvPreference.prefers_dark())
}

pub fn render_vars(config: &FolioConfig, theme: Theme) -> StyleVars {
    let mut vars = StyleVars::from_palette(config.palette(theme));
    vars.update_rgb_vars();
    vars
}

fn vars(args: &Args, theme: Option<Theme>, watch: bool) -> Result<ExitCode> {
    let theme = match theme {
        Some(theme) => theme,
        None => active_theme(&open_store(args)?),
    };
    let folio_config = config::resolve_config(args.config.as_deref())?;
    println!("{}", render_vars(&folio_config, theme));

    if watch {
        let config_path = args
            .config
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(config::get_config_path);
        crate::watch::watch_config(&config_path, || {
            let reloaded = config::resolve_config(args.config.as_deref())?;
            println!("{}", render_vars(&reloaded, theme));
            Ok(())
        })?;
    }

    Ok(ExitCode::SUCCESS)
}

fn theme_command(args: &Args, action: ThemeAction) -> Result<ExitCode> {
    let mut store = open_store(args)?;
    let theme = match action {
        ThemeAction::Show => active_theme(&store),
        ThemeAction::Toggle => theme::toggle_theme(&mut store, &EnvPreference)?,
        ThemeAction::Set { theme } => {
            theme::save_theme(&mut store, theme)?;
            theme
        }
        ThemeAction::Reset => {
            store.remove(theme::THEME_KEY)?;
            active_theme(&store)
        }
    };
    info!("State file: {}", store.path().display());
    println!("{} {}", theme.icon(), theme);
    Ok(ExitCode::SUCCESS)
}

fn contact_command(args: &Args, mut form: ContactForm, mailto: bool) -> Result<ExitCode> {
    let folio_config = config::resolve_config(args.config.as_deref())?;
    let contact_config = &folio_config.contact;

    if mailto {
        println!(
            "{}",
            contact::mailto_url(&contact_config.recipient, &contact_config.subject, &form)
        );
        return Ok(ExitCode::SUCCESS);
    }

    let relay: Box<dyn Relay> = match &contact_config.endpoint {
        Some(endpoint) => Box::new(HttpRelay::new(endpoint.clone())?),
        None => {
            info!("No contact endpoint configured, simulating delivery");
            Box::new(SimulatedRelay::new(Duration::from_millis(contact_config.latency_ms)))
        }
    };

    let result = contact::send(relay.as_ref(), &mut form, |status| {
        eprintln!("{}", status.message);
    });
    Ok(if result.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_vars_carry_rgb_channels() {
        let config = FolioConfig::default();
        let dark = render_vars(&config, Theme::Dark);
        assert_eq!(dark.get("--color-bg-rgb"), Some("11,18,32"));
        assert_eq!(dark.get("--color-accent-rgb"), Some("96,165,250"));
        assert_eq!(dark.get("--color-muted"), Some("#94a3b8"));
    }

    #[test]
    fn rgb_line_trims_and_rejects() {
        assert_eq!(rgb_line(" #2563eb\n").as_deref(), Some("37,99,235"));
        assert_eq!(rgb_line("#12345"), None);
        assert_eq!(rgb_line("2563eb"), None);
    }
}
