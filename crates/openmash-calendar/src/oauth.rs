//! Two-legged OAuth 1.0 request signing.
//!
//! Requests are signed with HMAC-SHA1 using only the consumer secret; there
//! is no user token. The signature covers the request method, the normalized
//! URL and every query parameter, including `xoauth_requestor_id`.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng as _;
use sha1::Sha1;
use url::Url;

use crate::error::{CalendarError, CalendarResult};

type HmacSha1 = Hmac<Sha1>;

/// OAuth protocol version sent with every request.
pub const OAUTH_VERSION: &str = "1.0";

/// The only signature method supported.
pub const HMAC_SHA1: &str = "HMAC-SHA1";

/// Percent-encodes per RFC 3986: everything except `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// HMAC-SHA1 signer holding the consumer secret.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthHmacSigner {
    client_shared_secret: Option<String>,
}

impl OAuthHmacSigner {
    pub fn new(client_shared_secret: Option<String>) -> Self {
        Self {
            client_shared_secret,
        }
    }

    pub fn signature_method(&self) -> &'static str {
        HMAC_SHA1
    }

    /// `secret&` with an empty token secret, as two-legged OAuth has no token.
    fn signing_key(&self) -> String {
        let secret = self.client_shared_secret.as_deref().unwrap_or_default();
        format!("{}&", percent_encode(secret))
    }

    /// Signs a signature base string and returns the base64 digest.
    pub fn compute_signature(&self, base_string: &str) -> CalendarResult<String> {
        let mut mac = HmacSha1::new_from_slice(self.signing_key().as_bytes())
            .map_err(|e| CalendarError::internal(format!("invalid HMAC key: {}", e)))?;
        mac.update(base_string.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for OAuthHmacSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthHmacSigner")
            .field(
                "client_shared_secret",
                &self.client_shared_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// OAuth parameters used to sign every request made by one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParameters {
    version: &'static str,
    consumer_key: Option<String>,
    signer: OAuthHmacSigner,
}

impl OAuthParameters {
    /// Creates parameters for OAuth version 1.0.
    pub fn new(consumer_key: Option<String>, signer: OAuthHmacSigner) -> Self {
        Self {
            version: OAUTH_VERSION,
            consumer_key,
            signer,
        }
    }

    pub fn version(&self) -> &str {
        self.version
    }

    pub fn consumer_key(&self) -> Option<&str> {
        self.consumer_key.as_deref()
    }

    pub fn signer(&self) -> &OAuthHmacSigner {
        &self.signer
    }

    /// Signs a request with a fresh nonce and the current time.
    pub fn sign(&self, method: &str, url: &Url) -> CalendarResult<SignedParameters> {
        let nonce = format!("{:x}", rand::rng().random::<u64>());
        let timestamp = Utc::now().timestamp().to_string();
        self.sign_with(method, url, nonce, timestamp)
    }

    /// Signs a request with a caller-chosen nonce and timestamp.
    pub fn sign_with(
        &self,
        method: &str,
        url: &Url,
        nonce: String,
        timestamp: String,
    ) -> CalendarResult<SignedParameters> {
        let mut signed = SignedParameters {
            consumer_key: self.consumer_key.clone(),
            nonce,
            signature: String::new(),
            signature_method: self.signer.signature_method(),
            timestamp,
            version: self.version,
        };
        let base_string = signature_base_string(method, url, &signed.protocol_parameters());
        signed.signature = self.signer.compute_signature(&base_string)?;
        Ok(signed)
    }
}

/// The `oauth_*` values computed for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParameters {
    consumer_key: Option<String>,
    nonce: String,
    signature: String,
    signature_method: &'static str,
    timestamp: String,
    version: &'static str,
}

impl SignedParameters {
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The parameters that take part in the signature (everything but the
    /// signature itself).
    fn protocol_parameters(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::with_capacity(5);
        if let Some(ref key) = self.consumer_key {
            params.push(("oauth_consumer_key", key.as_str()));
        }
        params.push(("oauth_nonce", self.nonce.as_str()));
        params.push(("oauth_signature_method", self.signature_method));
        params.push(("oauth_timestamp", self.timestamp.as_str()));
        params.push(("oauth_version", self.version));
        params
    }

    /// Renders the `Authorization` header value.
    pub fn authorization_header(&self) -> String {
        let mut fields = Vec::with_capacity(6);
        if let Some(ref key) = self.consumer_key {
            fields.push(("oauth_consumer_key", key.as_str()));
        }
        fields.push(("oauth_nonce", self.nonce.as_str()));
        fields.push(("oauth_signature", self.signature.as_str()));
        fields.push(("oauth_signature_method", self.signature_method));
        fields.push(("oauth_timestamp", self.timestamp.as_str()));
        fields.push(("oauth_version", self.version));

        let rendered: Vec<String> = fields
            .iter()
            .map(|(name, value)| format!("{}=\"{}\"", name, percent_encode(value)))
            .collect();
        format!("OAuth {}", rendered.join(", "))
    }
}

/// `scheme://host[:port]/path`, with the port only when it is not the
/// scheme's default.
fn normalized_url(url: &Url) -> String {
    let mut normalized = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        normalized.push_str(&format!(":{}", port));
    }
    normalized.push_str(url.path());
    normalized
}

/// Builds the RFC 5849 signature base string.
fn signature_base_string(method: &str, url: &Url, oauth_params: &[(&str, &str)]) -> String {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
        .collect();
    params.extend(
        oauth_params
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v))),
    );
    params.sort();

    let joined = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(&normalized_url(url)),
        percent_encode(&joined)
    )
}
