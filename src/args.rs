use clap::{Parser, Subcommand};

use crate::theme::Theme;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Colour, theme and contact helpers for a portfolio site")]
pub struct Args {
    /// Specify a custom configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// State file for saved preferences (defaults to the user data directory)
    #[arg(long, global = true)]
    pub state: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Decode a hex colour (#RGB or #RRGGBB) into "r,g,b"
    Rgb {
        hex: String,
    },

    /// Print the styling variables for a theme, including derived -rgb values
    Vars {
        /// Theme to print (defaults to the saved or system theme)
        #[arg(short, long, value_enum)]
        theme: Option<Theme>,

        /// Reprint whenever the config file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Show or change the saved theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Send a message through the contact relay
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,

        /// Print a mailto: link instead of sending
        #[arg(long)]
        mailto: bool,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ThemeAction {
    /// Print the active theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Save a theme
    Set {
        #[arg(value_enum)]
        theme: Theme,
    },
    /// Forget the saved theme and follow the system preference
    Reset,
}

impl Args {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vars_with_theme() {
        let args = Args::parse_from(["folio", "-vv", "vars", "--theme", "dark", "--watch"]);
        assert_eq!(args.log_level(), log::LevelFilter::Debug);
        match args.command {
            Command::Vars { theme, watch } => {
                assert_eq!(theme, Some(Theme::Dark));
                assert!(watch);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let args = Args::parse_from(["folio", "rgb", "#fff", "-c", "~/site.rune"]);
        assert_eq!(args.config.as_deref(), Some("~/site.rune"));
        assert_eq!(args.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn theme_set_requires_known_value() {
        assert!(Args::try_parse_from(["folio", "theme", "set", "sepia"]).is_err());
        let args = Args::parse_from(["folio", "theme", "set", "light"]);
        assert!(matches!(
            args.command,
            Command::Theme { action: Some(ThemeAction::Set { theme: Theme::Light }) }
        ));
    }

    #[test]
    fn contact_needs_all_flags() {
        assert!(Args::try_parse_from(["folio", "contact", "--name", "Ada"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
