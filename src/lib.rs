//! Core library entry for the `linkhub` CLI.
//!
//! The draft engine lives in [`draft`]; everything that talks to the outside
//! world goes through the traits in [`ports`], wired up by [`context`].

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod draft;
pub mod error;
pub mod logging;
pub mod model;
pub mod ports;
pub mod public;
pub mod session;

use clap::Parser;

use crate::config::Config;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I, config: &Config) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command, config)
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::config::Config;

    fn config_with_home(name: &str) -> Config {
        let home = std::env::temp_dir().join(format!("linkhub-lib-{name}-{}", std::process::id()));
        Config::from_lookup(move |key| match key {
            "LINKHUB_HOME" => Some(home.display().to_string()),
            _ => None,
        })
    }

    #[test]
    fn run_shows_status_without_backend() {
        let result = run(["linkhub", "status"], &config_with_home("status"));
        assert!(result.is_ok());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["linkhub", "unknown"], &config_with_home("unknown"));
        assert!(result.is_err());
    }

    #[test]
    fn remote_commands_need_backend_settings() {
        let err = run(["linkhub", "save"], &config_with_home("save")).unwrap_err();
        assert!(err.contains("LINKHUB_URL"), "{err}");
    }
}
