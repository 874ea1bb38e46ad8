//! Command-line interface parsing for creditline
//!
//! This module handles parsing of CLI arguments using clap: the subcommand to
//! run, the config file override and cookie validation for `save-cookie`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::cache::ConfigStore;
use crate::settings::{resolve_first, Candidate};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "CREDITLINE_CONFIG";

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The cookie passed to `save-cookie` is blank
    #[error("Cookie must not be empty. Copy the Cookie header of any request to the dashboard.")]
    EmptyCookie,

    /// No config file location could be determined
    #[error("Could not determine a config file location; pass --config <PATH>")]
    NoConfigPath,
}

/// creditline - mirror credits, plan and git context in one status line
#[derive(Parser, Debug)]
#[command(name = "creditline")]
#[command(about = "Status line showing mirror credits, plan, model and git context")]
#[command(version)]
pub struct Cli {
    /// Config file holding the session cookie and cached data
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands; `status` runs when none is given
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the status line (default)
    Status,
    /// Refresh the credit cache silently, for use in a stop hook
    Refresh,
    /// Save the dashboard session cookie, keeping all other settings
    ///
    /// Examples:
    ///   creditline save-cookie 'session=...; other=...'
    ///   creditline save-cookie 'session=...' --verify
    SaveCookie {
        /// Value of the Cookie header sent to the dashboard
        cookie: String,
        /// Fetch credits once with the new cookie and print the result
        #[arg(long)]
        verify: bool,
    },
    /// Show credit usage per API key over the last 24 hours
    Usage,
}

impl Cli {
    /// The subcommand to run, defaulting to `status`
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Status)
    }

    /// Opens the config store from `--config`, `CREDITLINE_CONFIG` or the default location
    pub fn config_store(&self, env: impl Fn(&str) -> Option<String>) -> Result<ConfigStore, CliError> {
        let explicit = self.config.as_deref().map(Path::to_path_buf);
        let from_env = resolve_first(&[Candidate::env(CONFIG_ENV)], env).map(PathBuf::from);

        match explicit.or(from_env) {
            Some(path) => Ok(ConfigStore::with_path(path)),
            None => ConfigStore::new().ok_or(CliError::NoConfigPath),
        }
    }
}

/// Validates a cookie argument
///
/// # Returns
/// * `Ok(String)` with surrounding whitespace removed
/// * `Err(CliError::EmptyCookie)` if nothing is left
pub fn parse_cookie_arg(s: &str) -> Result<String, CliError> {
    let cookie = s.trim();
    if cookie.is_empty() {
        return Err(CliError::EmptyCookie);
    }
    Ok(cookie.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_parse_cookie_arg_trims() {
        assert_eq!(parse_cookie_arg("  session=abc \n").unwrap(), "session=abc");
    }

    #[test]
    fn test_parse_cookie_arg_empty() {
        let err = parse_cookie_arg("   ").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_cli_parse_no_args_defaults_to_status() {
        let cli = Cli::parse_from(["creditline"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.command(), Command::Status);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_save_cookie() {
        let cli = Cli::parse_from(["creditline", "save-cookie", "a=b", "--verify"]);
        assert_eq!(
            cli.command(),
            Command::SaveCookie {
                cookie: "a=b".to_string(),
                verify: true
            }
        );
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["creditline", "refresh", "--config", "/tmp/c.json", "-v"]);
        assert_eq!(cli.command(), Command::Refresh);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_usage() {
        let cli = Cli::parse_from(["creditline", "usage"]);
        assert_eq!(cli.command(), Command::Usage);
    }

    #[test]
    fn test_cli_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["creditline", "bogus"]).is_err());
    }

    #[test]
    fn test_config_store_precedence() {
        let cli = Cli::parse_from(["creditline", "--config", "/tmp/flag.json"]);
        let store = cli
            .config_store(|_| Some("/tmp/env.json".to_string()))
            .unwrap();
        assert_eq!(store.path(), Path::new("/tmp/flag.json"));

        let cli = Cli::parse_from(["creditline"]);
        let store = cli
            .config_store(|name| (name == CONFIG_ENV).then(|| "/tmp/env.json".to_string()))
            .unwrap();
        assert_eq!(store.path(), Path::new("/tmp/env.json"));
    }

    #[test]
    fn test_config_store_default_location() {
        let cli = Cli::parse_from(["creditline"]);
        if let Ok(store) = cli.config_store(no_env) {
            assert!(store.path().ends_with("config.json"));
        }
        // Passes when no home directory is available
    }
}
