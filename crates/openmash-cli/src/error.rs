//! CLI error types.

use std::fmt;

use openmash_calendar::CalendarError;
use openmash_core::TracingError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Loading credentials or talking to the Calendar API failed.
    Calendar(CalendarError),
    /// Logging could not be set up.
    Tracing(TracingError),
    /// A response could not be rendered.
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calendar(err) => write!(f, "{}", err),
            Self::Tracing(err) => write!(f, "{}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Calendar(err) => Some(err),
            Self::Tracing(err) => Some(err),
            Self::Output(_) => None,
        }
    }
}

impl From<CalendarError> for CliError {
    fn from(err: CalendarError) -> Self {
        Self::Calendar(err)
    }
}

impl From<TracingError> for CliError {
    fn from(err: TracingError) -> Self {
        Self::Tracing(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}
