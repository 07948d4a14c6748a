//! Loading the API key and OAuth consumer credentials.

use std::fmt;
use std::fs::File;
use std::path::Path;

use tracing::debug;

use crate::error::{CalendarError, CalendarResult};
use crate::properties::Properties;

/// Property holding the Google API key.
pub const API_KEY_PROPERTY: &str = "google.apiKey";
/// Property holding the OAuth consumer key (usually the Workspace domain).
pub const CONSUMER_KEY_PROPERTY: &str = "google.oauth.consumerKey";
/// Property holding the OAuth consumer secret.
pub const CONSUMER_SECRET_PROPERTY: &str = "google.oauth.consumerSecret";

/// The API key and two-legged OAuth consumer credentials.
///
/// Missing properties are kept as `None`; nothing here checks that the
/// values are usable; a bad key or secret shows up as an authentication
/// failure on the first real request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    api_key: Option<String>,
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
}

impl CredentialSet {
    /// Creates a credential set from explicit values.
    pub fn new(
        api_key: Option<String>,
        consumer_key: Option<String>,
        consumer_secret: Option<String>,
    ) -> Self {
        Self {
            api_key,
            consumer_key,
            consumer_secret,
        }
    }

    /// Picks the three credential properties out of `properties`.
    pub fn from_properties(properties: &Properties) -> Self {
        let get = |key: &str| properties.get(key).map(str::to_string);
        Self::new(
            get(API_KEY_PROPERTY),
            get(CONSUMER_KEY_PROPERTY),
            get(CONSUMER_SECRET_PROPERTY),
        )
    }

    /// Reads credentials from a properties file.
    ///
    /// The file is closed before this returns, whether or not parsing
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Returns a [`CalendarErrorCode::Io`](crate::CalendarErrorCode::Io)
    /// error when the file cannot be opened, read, or decoded.
    pub fn load(path: impl AsRef<Path>) -> CalendarResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            CalendarError::io(format!("failed to open {}: {}", path.display(), e)).with_source(e)
        })?;
        let properties = Properties::load(file).map_err(|e| {
            CalendarError::io(format!("failed to read {}: {}", path.display(), e)).with_source(e)
        })?;

        let credentials = Self::from_properties(&properties);
        debug!(
            path = %path.display(),
            api_key = credentials.api_key.is_some(),
            consumer_key = credentials.consumer_key.is_some(),
            consumer_secret = credentials.consumer_secret.is_some(),
            "loaded calendar credentials"
        );
        Ok(credentials)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn consumer_key(&self) -> Option<&str> {
        self.consumer_key.as_deref()
    }

    pub fn consumer_secret(&self) -> Option<&str> {
        self.consumer_secret.as_deref()
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("consumer_key", &self.consumer_key)
            .field(
                "consumer_secret",
                &self.consumer_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
