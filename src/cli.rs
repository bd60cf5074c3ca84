/// CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::core::ConfigOverrides;

// Build timestamp injected at compile time
pub const VERSION_WITH_BUILD: &str = concat!(env!("CARGO_PKG_VERSION"), " (built: ", env!("BUILD_TIMESTAMP"), ")");

pub fn get_version() -> &'static str {
    VERSION_WITH_BUILD
}

#[derive(Parser, Debug)]
#[command(name = "overseer")]
#[command(author, version = VERSION_WITH_BUILD, about = "Live SSH health dashboard for a small cluster", long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/overseer/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Host to monitor, repeatable; replaces configured hosts
    #[arg(short = 'H', long = "host", global = true)]
    pub hosts: Vec<String>,

    /// SSH login user
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Per-poll timeout, e.g. "7s" or "1m"
    #[arg(short, long, global = true, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Write logs to this file (the dashboard owns the terminal)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll every host once and print the results
    Status {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// View effective configuration
    View,

    /// Validate configuration
    Validate,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            hosts: self.hosts.clone(),
            ssh_user: self.user.clone(),
            poll_timeout: self.timeout,
            log_file: self.log_file.clone(),
        }
    }
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_is_dashboard() {
        let cli = Cli::try_parse_from(["overseer"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.hosts.is_empty());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "overseer", "--host", "10.0.10.11", "-H", "10.0.10.12", "--user", "ops", "--timeout", "9s",
            "status", "--json",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.hosts, vec!["10.0.10.11", "10.0.10.12"]);
        assert_eq!(overrides.ssh_user.as_deref(), Some("ops"));
        assert_eq!(overrides.poll_timeout, Some(Duration::from_secs(9)));
        assert!(matches!(cli.command, Some(Commands::Status { json: true })));
    }

    #[test]
    fn test_version_carries_build_timestamp() {
        assert!(get_version().starts_with(env!("CARGO_PKG_VERSION")));
        assert!(get_version().contains(" (built: "));
    }

    #[test]
    fn test_bad_timeout_rejected() {
        assert!(Cli::try_parse_from(["overseer", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["overseer", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config { command: ConfigCommands::Validate })
        ));
    }
}
