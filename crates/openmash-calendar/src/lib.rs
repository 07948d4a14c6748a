//! Google Calendar clients for domain-wide delegated (two-legged OAuth)
//! access.
//!
//! Consumer credentials are read once from a `.properties` file; the
//! [`CalendarClientFactory`] then hands out one [`CalendarClient`] per user
//! the application needs to act for. Each client signs its requests with
//! OAuth 1.0 HMAC-SHA1 and stamps them with `xoauth_requestor_id`.
//!
//! ```text
//! credentials.properties
//!         │ CredentialSet::load
//!         ▼
//! ┌───────────────────────┐  build_client(email)  ┌──────────────────┐
//! │ CalendarClientFactory │ ────────────────────▶ │  CalendarClient  │
//! └───────────────────────┘                       └────────┬─────────┘
//!                                                          │ initialize, sign
//!                                                          ▼
//!                                              GET …?xoauth_requestor_id=email
//!                                              Authorization: OAuth …
//! ```
//!
//! # Example
//!
//! ```ignore
//! use openmash_calendar::CalendarClientFactory;
//!
//! let factory = CalendarClientFactory::from_properties_file("calendar.properties")?;
//! let client = factory.build_client("alice@example.com");
//! let calendars = client.list_calendars().await?;
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod initializer;
pub mod oauth;
pub mod properties;
pub mod request;

pub use client::{APPLICATION_NAME, CalendarClient, CalendarListEntry, ClientOptions, DEFAULT_BASE_URL};
pub use credentials::CredentialSet;
pub use error::{CalendarError, CalendarErrorCode, CalendarResult};
pub use factory::CalendarClientFactory;
pub use initializer::{REQUESTOR_ID_PARAM, RequestInitializer, TwoLeggedOAuthRequestInitializer};
pub use oauth::{OAuthHmacSigner, OAuthParameters, SignedParameters};
pub use properties::Properties;
pub use request::ApiRequest;
