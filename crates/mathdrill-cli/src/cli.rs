//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// mathdrill - Mental arithmetic drills logged to a spreadsheet
#[derive(Debug, Parser)]
#[command(name = "mathdrill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MATHDRILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Number of tasks in a session
    #[arg(long, short = 'n')]
    pub session_size: Option<usize>,

    /// Spreadsheet that receives the results
    #[arg(long, env = "MATHDRILL_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Path to Google Cloud Console credentials JSON file
    #[arg(long, env = "MATHDRILL_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Path of the cached token
    #[arg(long)]
    pub token_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorize with Google and cache the token, without running a session
    Auth {
        /// Run the authorization even if a token is already cached
        #[arg(long, short)]
        force: bool,
    },

    /// Remove the cached token
    Logout,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_invocation() {
        let cli = Cli::try_parse_from(["mathdrill"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "mathdrill",
            "-v",
            "--session-size",
            "3",
            "--spreadsheet-id",
            "1AbC",
            "--token-path",
            "/tmp/token.json",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.session_size, Some(3));
        assert_eq!(cli.spreadsheet_id.as_deref(), Some("1AbC"));
        assert_eq!(cli.token_path, Some(PathBuf::from("/tmp/token.json")));
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["mathdrill", "auth", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Auth { force: true })));

        let cli = Cli::try_parse_from(["mathdrill", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Path
            })
        ));

        let cli = Cli::try_parse_from(["mathdrill", "logout"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Logout)));
    }

    #[test]
    fn rejects_non_numeric_session_size() {
        assert!(Cli::try_parse_from(["mathdrill", "--session-size", "many"]).is_err());
    }
}
