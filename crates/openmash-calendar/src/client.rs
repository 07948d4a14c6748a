//! Google Calendar API client acting for one delegated user.
//!
//! A [`CalendarClient`] is produced by
//! [`CalendarClientFactory::build_client`](crate::CalendarClientFactory::build_client).
//! Every request it sends goes through its [`RequestInitializer`], is signed
//! with its [`OAuthParameters`], and carries the application name as the
//! `User-Agent`.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{CalendarError, CalendarResult};
use crate::initializer::RequestInitializer;
use crate::oauth::OAuthParameters;
use crate::request::ApiRequest;

/// Application name reported to Google.
pub const APPLICATION_NAME: &str = "OpenMash";

/// Base URL for Google Calendar API v3.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3/";

/// Settings shared by every client a factory builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Name sent as the `User-Agent` prefix.
    pub application_name: String,
    /// API root that request paths are resolved against.
    pub base_url: String,
    /// Per-request timeout of the shared HTTP transport.
    pub timeout: Duration,
}

impl ClientOptions {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parses `base_url`, adding a trailing slash so relative paths extend
    /// it instead of replacing its last segment.
    pub(crate) fn parsed_base_url(&self) -> CalendarResult<Url> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| {
            CalendarError::configuration(format!("invalid base URL {:?}: {}", self.base_url, e))
                .with_source(e)
        })
    }

    pub(crate) fn user_agent(&self) -> String {
        format!(
            "{} {}/{}",
            self.application_name,
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            application_name: APPLICATION_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// A calendar from the calendar list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    /// The calendar ID.
    pub id: String,
    /// The calendar summary (name).
    #[serde(default)]
    pub summary: String,
    pub description: Option<String>,
    /// Whether this is the user's primary calendar.
    #[serde(default)]
    pub primary: bool,
    pub time_zone: Option<String>,
    /// The user's access role for this calendar (`owner`, `reader`, ...).
    pub access_role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

/// Google Calendar API client bound to one requestor.
#[derive(Debug)]
pub struct CalendarClient {
    http_client: reqwest::Client,
    base_url: Url,
    application_name: String,
    user_agent: String,
    requestor_id: String,
    oauth: OAuthParameters,
    initializer: Box<dyn RequestInitializer>,
}

impl CalendarClient {
    pub(crate) fn new(
        http_client: reqwest::Client,
        options: &ClientOptions,
        base_url: Url,
        requestor_id: impl Into<String>,
        oauth: OAuthParameters,
        initializer: Box<dyn RequestInitializer>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            application_name: options.application_name.clone(),
            user_agent: options.user_agent(),
            requestor_id: requestor_id.into(),
            oauth,
            initializer,
        }
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// The full `User-Agent` header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Email address of the user this client acts for.
    pub fn requestor_id(&self) -> &str {
        &self.requestor_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn oauth_parameters(&self) -> &OAuthParameters {
        &self.oauth
    }

    pub fn initializer(&self) -> &dyn RequestInitializer {
        self.initializer.as_ref()
    }

    /// Starts a request for `path`, relative to the API base URL.
    ///
    /// The resolved URL must stay under the base URL: absolute URLs to other
    /// origins and `..` segments leaving the API root are rejected, so signed
    /// requests never go anywhere else.
    pub fn request(&self, method: Method, path: &str) -> CalendarResult<ApiRequest> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| {
                CalendarError::bad_request(format!("invalid request path {:?}: {}", path, e))
                    .with_source(e)
            })?;

        if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path())
        {
            return Err(CalendarError::bad_request(format!(
                "request path {:?} resolves outside {}",
                path, self.base_url
            )));
        }
        Ok(ApiRequest::new(method, url))
    }

    /// Runs the initializer, signs the result, and builds the HTTP request.
    pub fn prepare(&self, request: ApiRequest) -> CalendarResult<reqwest::Request> {
        let request = self.initializer.initialize(request);
        let url = request.url_with_parameters();
        let signed = self.oauth.sign(request.method().as_str(), &url)?;

        self.http_client
            .request(request.method().clone(), url)
            .header(AUTHORIZATION, signed.authorization_header())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .build()
            .map_err(|e| {
                CalendarError::internal(format!("failed to build request: {}", e)).with_source(e)
            })
    }

    /// Sends a request and decodes the JSON response body.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> CalendarResult<T> {
        let request = self.prepare(request)?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "sending calendar request");

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                CalendarError::network("request timeout").with_source(e)
            } else if e.is_connect() {
                CalendarError::network(format!("connection failed: {}", e)).with_source(e)
            } else {
                CalendarError::network(format!("request failed: {}", e)).with_source(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            let err = error_for_status(status, retry_after, &body);
            warn!(%method, %path, status = status.as_u16(), "calendar request failed");
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| {
                CalendarError::network(format!("failed to read response: {}", e)).with_source(e)
            })?;

        serde_json::from_str(&body).map_err(|e| {
            CalendarError::invalid_response(format!("failed to parse response: {}", e))
                .with_source(e)
        })
    }

    /// GETs `path` and decodes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> CalendarResult<T> {
        let request = self.request(Method::GET, path)?;
        self.execute_json(request).await
    }

    /// Lists the requestor's calendars (first page only).
    pub async fn list_calendars(&self) -> CalendarResult<Vec<CalendarListEntry>> {
        let response: CalendarListResponse = self.get_json("users/me/calendarList").await?;
        Ok(response.items)
    }
}

/// Maps a non-success status to an error.
fn error_for_status(
    status: reqwest::StatusCode,
    retry_after: Option<u64>,
    body: &str,
) -> CalendarError {
    use reqwest::StatusCode;

    let err = match status {
        StatusCode::UNAUTHORIZED => {
            CalendarError::authentication("OAuth signature or consumer key rejected")
        }
        StatusCode::FORBIDDEN => CalendarError::authorization("access denied for requestor"),
        StatusCode::NOT_FOUND => CalendarError::not_found("resource not found"),
        StatusCode::BAD_REQUEST => CalendarError::bad_request(format!("bad request: {}", body)),
        StatusCode::TOO_MANY_REQUESTS => CalendarError::rate_limited(format!(
            "rate limit exceeded{}",
            retry_after
                .map(|s| format!(", retry after {} seconds", s))
                .unwrap_or_default()
        )),
        _ => CalendarError::server(format!("API error ({}): {}", status, body)),
    };
    err.with_status(status.as_u16())
}
