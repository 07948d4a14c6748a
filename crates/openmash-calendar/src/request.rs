//! Outgoing API requests before they are signed and sent.

use reqwest::Method;
use url::Url;

/// An API request as seen by a [`RequestInitializer`](crate::RequestInitializer).
///
/// `parameters` are extra query parameters that are appended to the URL
/// when the request is dispatched, after any query the URL already has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    parameters: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            parameters: Vec::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Adds a query parameter, keeping any existing one with the same name.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Returns the extra parameter named `key`.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Replaces every extra parameter with `parameters`.
    #[must_use]
    pub fn with_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// The URL that will actually be requested.
    pub fn url_with_parameters(&self) -> Url {
        let mut url = self.url.clone();
        if !self.parameters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.parameters {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ApiRequest {
        ApiRequest::new(
            Method::GET,
            Url::parse("https://example.com/calendar/v3/users/me/calendarList").unwrap(),
        )
    }

    #[test]
    fn parameters_are_appended_after_query() {
        let request = request()
            .with_query("maxResults", "5")
            .with_parameters([("xoauth_requestor_id", "bob@example.com")]);

        assert_eq!(
            request.url_with_parameters().as_str(),
            "https://example.com/calendar/v3/users/me/calendarList\
             ?maxResults=5&xoauth_requestor_id=bob%40example.com"
        );
        assert_eq!(request.url().query(), Some("maxResults=5"));
    }

    #[test]
    fn with_parameters_replaces_previous_set() {
        let request = request()
            .with_parameters([("a", "1"), ("b", "2")])
            .with_parameters([("c", "3")]);

        assert_eq!(request.parameters().len(), 1);
        assert_eq!(request.parameter("c"), Some("3"));
        assert_eq!(request.parameter("a"), None);
    }

    #[test]
    fn no_parameters_leaves_url_untouched() {
        let request = request();
        assert_eq!(request.url_with_parameters(), *request.url());
        assert_eq!(request.method(), &Method::GET);
    }
}
