#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tether_api::{ApiClient, Error, TokenSource};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::new(base_url, TokenSource::fixed("test-token")).unwrap();
    (server, client)
}

// ── Auth & transport tests ──────────────────────────────────────────

#[tokio::test]
async fn test_bearer_header_attached_to_every_request() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "service": "tether-companion",
            "version": "1.4.2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client.health().await.unwrap();
    assert_eq!(info.status, "healthy");
    assert_eq!(info.service, "tether-companion");
}

#[tokio::test]
async fn test_token_failure_skips_network_call() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let tokens = TokenSource::File {
        path: dir.path().join("no-such-token"),
    };
    let client = ApiClient::new(Url::parse(&server.uri()).unwrap(), tokens).unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("unreachable"))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.health().await;

    assert!(
        matches!(result, Err(Error::TokenUnavailable { .. })),
        "expected TokenUnavailable, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Reserve a loopback port, then free it so connecting is refused.
    // A dropped `MockServer` can't stand in for a dead port: wiremock
    // pools servers, so its listener outlives the handle and answers
    // with an unmatched-request 404.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
    drop(listener);

    let client = ApiClient::new(base_url, TokenSource::fixed("test-token")).unwrap();
    let result = client.health().await;

    match result {
        Err(Error::Network(e)) => assert!(e.is_connect(), "not a connect error: {e}"),
        other => panic!("expected Network error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_401_is_http_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/vpn/status"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid or missing token" })),
        )
        .mount(&server)
        .await;

    let err = client.vpn_status().await.unwrap_err();

    assert!(err.is_unauthorized(), "expected 401, got: {err:?}");
    match err {
        Error::Http { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Invalid or missing token");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

// ── Text endpoint tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_credentials_unwraps_quoted_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_creds"))
        .and(query_param("context", "console"))
        .and(query_param("headless", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"jdoe,hunter2\"\n"))
        .mount(&server)
        .await;

    let creds = client.credentials("console", true).await.unwrap();

    assert_eq!(creds.username, "jdoe");
    assert_eq!(creds.expose_pair(), "jdoe,hunter2");
}

#[tokio::test]
async fn test_credentials_failed_sentinel() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_creds"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"Failed\""))
        .mount(&server)
        .await;

    let result = client.credentials("console", false).await;

    assert!(
        matches!(result, Err(Error::OperationFailed { .. })),
        "expected OperationFailed, got: {result:?}"
    );
}

#[tokio::test]
async fn test_associate_email_normalized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_associate_email"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"jdoe@example.com\"\n"))
        .mount(&server)
        .await;

    let email = client.associate_email().await.unwrap();
    assert_eq!(email, "jdoe@example.com");
}

#[tokio::test]
async fn test_empty_text_body_is_parse_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_associate_email"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"\"\n"))
        .mount(&server)
        .await;

    let result = client.associate_email().await;

    assert!(
        matches!(result, Err(Error::Parse { .. })),
        "expected Parse error, got: {result:?}"
    );
}

// ── VPN endpoint tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_vpn_status_parses() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/vpn/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "connected": true,
            "profile_name": "IAD2",
            "profile_id": "iad2",
            "connection_details": { "tunnel": "tun0" }
        })))
        .mount(&server)
        .await;

    let status = client.vpn_status().await.unwrap();

    assert!(status.connected);
    assert_eq!(status.profile_name.as_deref(), Some("IAD2"));
    assert_eq!(status.profile_id.as_deref(), Some("iad2"));
}

#[tokio::test]
async fn test_vpn_profiles_parses_list() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/vpn/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "iad2", "name": "IAD2", "remote": "vpn.iad2.example.com", "port": 443 },
            { "id": "ams2", "name": "AMS2" },
        ])))
        .mount(&server)
        .await;

    let profiles = client.vpn_profiles().await.unwrap();

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].id, "iad2");
    assert_eq!(profiles[0].remote.as_deref(), Some("vpn.iad2.example.com"));
    assert_eq!(profiles[1].name, "AMS2");
    assert_eq!(profiles[1].port, None);
}

#[tokio::test]
async fn test_vpn_default_not_configured_is_404() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/vpn/default"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "detail": "No default VPN profile configured" })),
        )
        .mount(&server)
        .await;

    let err = client.vpn_default().await.unwrap_err();

    assert!(err.is_not_found(), "expected 404, got: {err:?}");
}

#[tokio::test]
async fn test_set_default_success_false_is_operation_failed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/vpn/default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "unknown profile: bogus"
        })))
        .mount(&server)
        .await;

    let result = client.set_vpn_default("bogus").await;

    match result {
        Err(Error::OperationFailed { ref message }) => {
            assert_eq!(message, "unknown profile: bogus");
        }
        other => panic!("expected OperationFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_posts_to_profile_path() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/vpn/connect/iad2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "profile_id": "iad2",
            "profile_name": "IAD2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.vpn_connect("iad2").await.unwrap();

    assert!(resp.success);
    assert_eq!(resp.profile_name.as_deref(), Some("IAD2"));
}

#[tokio::test]
async fn test_disconnect_when_not_connected_succeeds() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/vpn/disconnect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "VPN was not connected",
            "was_connected": false
        })))
        .mount(&server)
        .await;

    let resp = client.vpn_disconnect().await.unwrap();

    assert!(resp.success);
    assert_eq!(resp.was_connected, Some(false));
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/vpn/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let result = client.vpn_status().await;

    assert!(
        matches!(result, Err(Error::Parse { .. })),
        "expected Parse error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_invalid_json_with_multibyte_body_is_parse_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/vpn/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("{}€ and then some", "x".repeat(199))),
        )
        .mount(&server)
        .await;

    let result = client.vpn_status().await;

    assert!(
        matches!(result, Err(Error::Parse { .. })),
        "expected Parse error, got: {result:?}"
    );
}
