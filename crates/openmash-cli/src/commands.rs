//! Subcommand implementations.

use std::path::Path;
use std::time::Duration;

use openmash_calendar::{CalendarClientFactory, CalendarListEntry, ClientOptions, CredentialSet};
use openmash_core::tracing::{TracingConfig, init_tracing};
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliResult;

/// Installs the global subscriber.
pub fn init_logging(config: TracingConfig) -> CliResult<()> {
    init_tracing(config)?;
    Ok(())
}

/// Loads credentials and creates a factory configured from the flags.
pub fn factory(cli: &Cli) -> CliResult<CalendarClientFactory> {
    let credentials = CredentialSet::load(&cli.properties)?;
    let options = ClientOptions::default()
        .with_base_url(&cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout));
    debug!(base_url = %cli.base_url, timeout = cli.timeout, "creating client factory");
    Ok(CalendarClientFactory::with_options(credentials, options)?)
}

fn presence(value: Option<&str>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "set",
        Some(_) => "empty",
        None => "missing",
    }
}

/// Builds a client for `user` and describes its configuration.
///
/// Secrets are only reported as set, empty, or missing.
pub fn check(factory: &CalendarClientFactory, properties: &Path, user: &str) -> String {
    let client = factory.build_client(user);
    let credentials = factory.credentials();
    let params = client.oauth_parameters();

    [
        format!("properties:      {}", properties.display()),
        format!("requestor:       {}", user),
        format!("application:     {}", client.application_name()),
        format!("base url:        {}", client.base_url()),
        format!("oauth version:   {}", params.version()),
        format!(
            "consumer key:    {}",
            params.consumer_key().unwrap_or("<missing>")
        ),
        format!("consumer secret: {}", presence(credentials.consumer_secret())),
        format!("api key:         {}", presence(credentials.api_key())),
    ]
    .join("\n")
}

/// Renders calendars as a table, or as JSON when `json` is set.
pub fn render_calendars(calendars: &[CalendarListEntry], json: bool) -> CliResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(calendars)?);
    }
    if calendars.is_empty() {
        return Ok("No calendars".to_string());
    }

    let lines: Vec<String> = calendars
        .iter()
        .map(|cal| {
            let marker = if cal.primary { "*" } else { " " };
            let role = cal.access_role.as_deref().unwrap_or("-");
            format!("{} {:<8} {}  ({})", marker, role, cal.summary, cal.id)
        })
        .collect();
    Ok(lines.join("\n"))
}
