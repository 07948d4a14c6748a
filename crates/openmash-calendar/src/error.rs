//! Error types for credential loading and calendar requests.
//!
//! Loading credentials can only fail with [`CalendarErrorCode::Io`]. Every
//! other code describes something that went wrong once a built client
//! actually talked to the Calendar API.

use std::fmt;
use thiserror::Error;

/// The category of a [`CalendarError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarErrorCode {
    /// The properties resource could not be opened or read.
    Io,
    /// Client options are unusable (bad base URL, HTTP client setup).
    ConfigurationError,
    /// The API rejected the OAuth signature or consumer key (401).
    AuthenticationFailed,
    /// The requestor is not allowed to access the resource (403).
    AuthorizationFailed,
    /// Connection failed, timed out, or the body could not be read.
    NetworkError,
    /// Too many requests (429).
    RateLimited,
    /// Any other non-success status.
    ServerError,
    /// The response body was not the expected JSON.
    InvalidResponse,
    /// Resource not found (404).
    NotFound,
    /// Request was invalid (400).
    BadRequest,
    /// Unexpected internal state.
    InternalError,
}

impl CalendarErrorCode {
    /// Returns a machine-friendly name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Io => "io",
            Self::ConfigurationError => "configuration_error",
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for CalendarErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while loading credentials or using a calendar client.
#[derive(Debug, Error)]
pub struct CalendarError {
    code: CalendarErrorCode,
    message: String,
    /// HTTP status of the failed response, when there was one.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CalendarError {
    /// Creates a new error with the given code and message.
    pub fn new(code: CalendarErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::Io, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::ConfigurationError, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::InvalidResponse, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::NotFound, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::BadRequest, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::InternalError, message)
    }

    /// Records the HTTP status that produced this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> CalendarErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns true for errors raised while reading configuration.
    pub fn is_io(&self) -> bool {
        self.code == CalendarErrorCode::Io
    }

    /// Returns the underlying I/O error kind, if this wraps one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        self.source
            .as_ref()
            .and_then(|source| source.downcast_ref::<std::io::Error>())
            .map(std::io::Error::kind)
    }
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

/// A specialized Result type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
