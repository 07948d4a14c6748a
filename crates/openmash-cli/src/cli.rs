//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use openmash_calendar::DEFAULT_BASE_URL;
use openmash_core::tracing::{TracingConfig, TracingOutputFormat};

/// openmash - act on a Google Calendar as a delegated user
#[derive(Debug, Parser)]
#[command(name = "openmash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Properties file with google.apiKey and google.oauth.consumer{Key,Secret}
    #[arg(long, short, env = "OPENMASH_PROPERTIES")]
    pub properties: PathBuf,

    /// Email address of the user to act for
    #[arg(long, short, env = "OPENMASH_USER")]
    pub user: String,

    /// Calendar API base URL
    #[arg(long, env = "OPENMASH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log output format on stderr
    #[arg(long, value_enum, env = "OPENMASH_LOG_FORMAT", default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Logging setup selected by `--debug` and `--log-format`.
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig::for_cli(self.debug).with_format(self.log_format.into())
    }
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
            LogFormat::Json => Self::Json,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load credentials and build a client without contacting Google
    Check,

    /// List the user's calendars
    Calendars {
        /// Print the raw entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// GET a path relative to the API base URL and print the JSON response
    Get {
        /// For example `calendars/primary/events`
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_with_defaults() {
        let cli = Cli::try_parse_from([
            "openmash",
            "--properties",
            "/etc/openmash/calendar.properties",
            "--user",
            "alice@example.com",
            "check",
        ])
        .unwrap();

        assert_eq!(
            cli.properties,
            PathBuf::from("/etc/openmash/calendar.properties")
        );
        assert_eq!(cli.user, "alice@example.com");
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
        assert_eq!(cli.timeout, 30);
        assert!(!cli.debug);
        assert_eq!(cli.log_format, LogFormat::Compact);
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn log_format_selects_tracing_output() {
        let cli = Cli::try_parse_from([
            "openmash", "-p", "c.properties", "-u", "a@b.c", "--log-format", "json", "-v", "check",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);

        let config = cli.tracing_config();
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.default_level, tracing::Level::DEBUG);

        let cli = Cli::try_parse_from([
            "openmash", "-p", "c.properties", "-u", "a@b.c", "--log-format", "pretty", "check",
        ])
        .unwrap();
        assert_eq!(cli.tracing_config().output_format, TracingOutputFormat::Pretty);

        assert!(
            Cli::try_parse_from([
                "openmash", "-p", "c.properties", "-u", "a@b.c", "--log-format", "xml", "check",
            ])
            .is_err()
        );
    }

    #[test]
    fn parses_get_and_calendars() {
        let cli = Cli::try_parse_from([
            "openmash", "-p", "c.properties", "-u", "a@b.c", "-v", "get", "colors",
        ])
        .unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Get { ref path } if path == "colors"));

        let cli = Cli::try_parse_from([
            "openmash", "-p", "c.properties", "-u", "a@b.c", "calendars", "--json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Calendars { json: true }));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["openmash", "-p", "c.properties", "-u", "a@b.c"]).is_err());
    }
}
