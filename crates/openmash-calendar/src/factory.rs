//! Builds per-user calendar clients from one set of consumer credentials.

use std::path::Path;

use tracing::debug;
use url::Url;

use crate::client::{CalendarClient, ClientOptions};
use crate::credentials::CredentialSet;
use crate::error::{CalendarError, CalendarResult};
use crate::initializer::TwoLeggedOAuthRequestInitializer;
use crate::oauth::{OAuthHmacSigner, OAuthParameters};

/// Produces [`CalendarClient`]s that act on behalf of individual users of a
/// Google Workspace domain.
///
/// The factory owns the credentials and one HTTP transport; every client it
/// builds shares that transport but has its own signing parameters and
/// requestor. Building a client performs no network I/O.
#[derive(Debug)]
pub struct CalendarClientFactory {
    credentials: CredentialSet,
    options: ClientOptions,
    base_url: Url,
    http_client: reqwest::Client,
}

impl CalendarClientFactory {
    /// Creates a factory with [`ClientOptions::default`].
    pub fn new(credentials: CredentialSet) -> CalendarResult<Self> {
        Self::with_options(credentials, ClientOptions::default())
    }

    /// Creates a factory with custom options.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if the base URL does not parse or
    /// the HTTP transport cannot be set up.
    pub fn with_options(credentials: CredentialSet, options: ClientOptions) -> CalendarResult<Self> {
        let base_url = options.parsed_base_url()?;
        let http_client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| {
                CalendarError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            credentials,
            options,
            base_url,
            http_client,
        })
    }

    /// Loads credentials from a properties file and creates a factory.
    ///
    /// # Errors
    ///
    /// Fails with an [`Io`](crate::CalendarErrorCode::Io) error if the file
    /// cannot be read; no factory exists in that case.
    pub fn from_properties_file(path: impl AsRef<Path>) -> CalendarResult<Self> {
        Self::new(CredentialSet::load(path)?)
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Builds fresh OAuth parameters from the stored consumer credentials.
    pub fn oauth_parameters(&self) -> OAuthParameters {
        let signer = OAuthHmacSigner::new(self.credentials.consumer_secret().map(str::to_string));
        OAuthParameters::new(self.credentials.consumer_key().map(str::to_string), signer)
    }

    /// Builds a client that acts as `email`.
    ///
    /// The address is passed through untouched; an unknown or malformed one
    /// is rejected by Google when the client is first used.
    pub fn build_client(&self, email: &str) -> CalendarClient {
        let initializer = TwoLeggedOAuthRequestInitializer::new(
            self.credentials.api_key().map(str::to_string),
            email,
        );
        debug!(requestor = email, "building calendar client");

        CalendarClient::new(
            self.http_client.clone(),
            &self.options,
            self.base_url.clone(),
            email,
            self.oauth_parameters(),
            Box::new(initializer),
        )
    }
}
