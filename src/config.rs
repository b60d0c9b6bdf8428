//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Which configured endpoint to talk to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DeployMode {
    Development,
    #[default]
    Production,
}

/// Terminal console for a remote user directory service.
#[derive(Parser, Debug, Clone)]
#[command(name = "userdesk", version, about)]
pub struct Cli {
    /// Deployment mode; selects the local or the server base URL.
    #[arg(long, env = "USERDESK_MODE", value_enum, default_value_t = DeployMode::Production)]
    pub mode: DeployMode,

    /// Base URL used in development mode.
    #[arg(long, env = "USERDESK_LOCAL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub local_base_url: String,

    /// Base URL used in production mode.
    #[arg(long, env = "USERDESK_SERVER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub server_base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "USERDESK_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Theme file (created with defaults if missing).
    #[arg(long, default_value = "theme.conf")]
    pub theme: PathBuf,

    /// Keybinding file (created with defaults if missing).
    #[arg(long, default_value = "keybinds.conf")]
    pub keybinds: PathBuf,

    /// Log file for the interactive console.
    #[arg(long, env = "USERDESK_LOG_FILE", default_value = "userdesk.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the user list and exit.
    List {
        /// Only show users whose name or email contains this text.
        #[arg(long, short)]
        query: Option<String>,
    },
    /// Create a user, then print the refreshed list.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

impl Cli {
    /// Base URL for the selected mode, without a trailing slash.
    pub fn base_url(&self) -> &str {
        let url = match self.mode {
            DeployMode::Development => &self.local_base_url,
            DeployMode::Production => &self.server_base_url,
        };
        url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selects_base_url() {
        let cli = Cli::parse_from([
            "userdesk",
            "--mode",
            "development",
            "--local-base-url",
            "http://127.0.0.1:8080/",
            "--server-base-url",
            "https://users.example.com",
        ]);
        assert_eq!(cli.base_url(), "http://127.0.0.1:8080");

        let cli = Cli::parse_from(["userdesk", "--server-base-url", "https://users.example.com"]);
        assert_eq!(cli.mode, DeployMode::Production);
        assert_eq!(cli.base_url(), "https://users.example.com");
        assert!(cli.command.is_none());
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::parse_from(["userdesk", "add", "--name", "Ann", "--email", "a@x.com"]);
        assert_eq!(
            cli.command,
            Some(Command::Add { name: "Ann".into(), email: "a@x.com".into() })
        );
        let cli = Cli::parse_from(["userdesk", "list", "-q", "ann"]);
        assert_eq!(cli.command, Some(Command::List { query: Some("ann".into()) }));
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let cli = Cli::parse_from(["userdesk", "--timeout-secs", "0"]);
        assert_eq!(cli.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
