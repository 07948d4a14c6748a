//! Hooks that adjust every request a client sends.

use std::fmt;

use crate::request::ApiRequest;

/// Query parameter naming the user a two-legged request acts for.
pub const REQUESTOR_ID_PARAM: &str = "xoauth_requestor_id";

/// Adjusts a request before it is signed and dispatched.
pub trait RequestInitializer: fmt::Debug + Send + Sync {
    fn initialize(&self, request: ApiRequest) -> ApiRequest;
}

/// Stamps `xoauth_requestor_id` on every request so that a domain-wide
/// delegated consumer acts on behalf of one user.
///
/// The API key is kept alongside the requestor for callers that need it,
/// but is not added to requests: the OAuth signature already identifies the
/// application.
#[derive(Clone, PartialEq, Eq)]
pub struct TwoLeggedOAuthRequestInitializer {
    api_key: Option<String>,
    requestor_id: String,
}

impl TwoLeggedOAuthRequestInitializer {
    pub fn new(api_key: Option<String>, requestor_id: impl Into<String>) -> Self {
        Self {
            api_key,
            requestor_id: requestor_id.into(),
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn requestor_id(&self) -> &str {
        &self.requestor_id
    }
}

impl RequestInitializer for TwoLeggedOAuthRequestInitializer {
    fn initialize(&self, request: ApiRequest) -> ApiRequest {
        request.with_parameters([(REQUESTOR_ID_PARAM, self.requestor_id.as_str())])
    }
}

impl fmt::Debug for TwoLeggedOAuthRequestInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoLeggedOAuthRequestInitializer")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("requestor_id", &self.requestor_id)
            .finish()
    }
}
