//! End-to-end checks of what a built client puts on the wire.

use std::collections::HashMap;

use openmash_calendar::{
    CalendarClientFactory, CalendarErrorCode, ClientOptions, CredentialSet,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALENDAR_LIST: &str = "/calendar/v3/users/me/calendarList";

fn factory_for(server: &MockServer) -> CalendarClientFactory {
    let credentials = CredentialSet::new(
        Some("AIzaExample".to_string()),
        Some("example.com".to_string()),
        Some("consumer-secret".to_string()),
    );
    let options = ClientOptions::default().with_base_url(format!("{}/calendar/v3", server.uri()));
    CalendarClientFactory::with_options(credentials, options).unwrap()
}

/// Splits `OAuth k="v", k2="v2"` into decoded pairs.
fn parse_oauth_header(value: &str) -> HashMap<String, String> {
    value
        .strip_prefix("OAuth ")
        .expect("OAuth scheme")
        .split(", ")
        .map(|field| {
            let (name, quoted) = field.split_once('=').expect("name=value");
            let raw = quoted.trim_matches('"');
            (
                name.to_string(),
                urlencoding::decode(raw).unwrap().into_owned(),
            )
        })
        .collect()
}

#[tokio::test]
async fn list_calendars_sends_signed_delegated_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALENDAR_LIST))
        .and(query_param("xoauth_requestor_id", "alice@example.com"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "calendar#calendarList",
            "items": [
                { "id": "alice@example.com", "summary": "Alice", "primary": true }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = factory_for(&server).build_client("alice@example.com");
    let calendars = client.list_calendars().await.unwrap();

    assert_eq!(calendars.len(), 1);
    assert_eq!(calendars[0].id, "alice@example.com");
    assert!(calendars[0].primary);

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let auth = request
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    let fields = parse_oauth_header(auth);

    assert_eq!(fields["oauth_consumer_key"], "example.com");
    assert_eq!(fields["oauth_signature_method"], "HMAC-SHA1");
    assert_eq!(fields["oauth_version"], "1.0");

    // The mock server sees `localhost` as the host, so rebuild the URL the
    // client actually signed.
    let signed_url = Url::parse(&format!(
        "{}{}?{}",
        server.uri(),
        request.url.path(),
        request.url.query().unwrap()
    ))
    .unwrap();
    let expected = client
        .oauth_parameters()
        .sign_with(
            "GET",
            &signed_url,
            fields["oauth_nonce"].clone(),
            fields["oauth_timestamp"].clone(),
        )
        .unwrap();
    assert_eq!(fields["oauth_signature"], expected.signature());
}

#[tokio::test]
async fn user_agent_carries_application_name() {
    let server = MockServer::start().await;
    let client = factory_for(&server).build_client("alice@example.com");

    Mock::given(method("GET"))
        .and(path("/calendar/v3/colors"))
        .and(header("user-agent", client.user_agent()))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "calendar#colors" })))
        .expect(1)
        .mount(&server)
        .await;

    let body: serde_json::Value = client.get_json("colors").await.unwrap();
    assert_eq!(body["kind"], "calendar#colors");
    assert!(client.user_agent().starts_with("OpenMash "));
}

#[tokio::test]
async fn each_client_acts_for_its_own_user() {
    let server = MockServer::start().await;
    for user in ["a@example.com", "b@example.com"] {
        Mock::given(method("GET"))
            .and(path(CALENDAR_LIST))
            .and(query_param("xoauth_requestor_id", user))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [ { "id": user, "summary": user } ]
            })))
            .expect(2)
            .mount(&server)
            .await;
    }

    let factory = factory_for(&server);
    let a = factory.build_client("a@example.com");
    let b = factory.build_client("b@example.com");

    assert_eq!(a.list_calendars().await.unwrap()[0].id, "a@example.com");
    assert_eq!(b.list_calendars().await.unwrap()[0].id, "b@example.com");
    assert_eq!(a.list_calendars().await.unwrap()[0].id, "a@example.com");
    assert_eq!(b.list_calendars().await.unwrap()[0].id, "b@example.com");
}

#[tokio::test]
async fn error_statuses_map_to_codes() {
    let server = MockServer::start().await;
    let cases = [
        ("/calendar/v3/unauthorized", 401u16, CalendarErrorCode::AuthenticationFailed),
        ("/calendar/v3/forbidden", 403, CalendarErrorCode::AuthorizationFailed),
        ("/calendar/v3/missing", 404, CalendarErrorCode::NotFound),
        ("/calendar/v3/invalid", 400, CalendarErrorCode::BadRequest),
        ("/calendar/v3/broken", 503, CalendarErrorCode::ServerError),
    ];
    for (route, status, _) in &cases {
        Mock::given(method("GET"))
            .and(path(*route))
            .respond_with(ResponseTemplate::new(*status))
            .mount(&server)
            .await;
    }

    let client = factory_for(&server).build_client("alice@example.com");
    for (route, status, code) in cases {
        let relative = route.trim_start_matches("/calendar/v3/");
        let err = client
            .get_json::<serde_json::Value>(relative)
            .await
            .unwrap_err();
        assert_eq!(err.code(), code, "route {}", route);
        assert_eq!(err.status(), Some(status));
    }
}

#[tokio::test]
async fn rate_limit_reports_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALENDAR_LIST))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let client = factory_for(&server).build_client("alice@example.com");
    let err = client.list_calendars().await.unwrap_err();
    assert_eq!(err.code(), CalendarErrorCode::RateLimited);
    assert!(err.message().contains("retry after 7 seconds"));
}

#[tokio::test]
async fn undecodable_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALENDAR_LIST))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let client = factory_for(&server).build_client("alice@example.com");
    let err = client.list_calendars().await.unwrap_err();
    assert_eq!(err.code(), CalendarErrorCode::InvalidResponse);
}

#[tokio::test]
async fn building_clients_makes_no_requests() {
    let server = MockServer::start().await;
    let factory = factory_for(&server);
    let _a = factory.build_client("a@example.com");
    let _b = factory.build_client("a@example.com");

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn truncated_body_is_network_error_with_source() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\n\
                  Content-Type: application/json\r\n\
                  Content-Length: 100\r\n\r\n{\"items\"",
            )
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let options = ClientOptions::default().with_base_url(format!("http://{}/calendar/v3", addr));
    let factory = CalendarClientFactory::with_options(CredentialSet::default(), options).unwrap();
    let err = factory
        .build_client("alice@example.com")
        .list_calendars()
        .await
        .unwrap_err();

    assert_eq!(err.code(), CalendarErrorCode::NetworkError);
    assert!(err.message().contains("failed to read response"));
    assert!(std::error::Error::source(&err).is_some());
}
