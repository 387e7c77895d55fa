// Integration tests for `RestClient` using wiremock.
#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use wanwatch_api::{Error, RestClient, WantedInterfaces};

// ── Helpers ─────────────────────────────────────────────────────────

const MD5_CHALLENGE: &str =
    r#"Digest realm="SonicWall", nonce="a1b2c3", qop="auth", algorithm=MD5, opaque="0p4q""#;
const SHA_CHALLENGE: &str =
    r#"Digest realm="SonicWall", nonce="d4e5f6", qop="auth", algorithm=SHA-256"#;

/// Matches requests carrying no `Authorization` header.
struct Anonymous;

impl Match for Anonymous {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

/// Matches a digest `Authorization` header with the given nonce count.
struct DigestWithNonceCount(&'static str);

impl Match for DigestWithNonceCount {
    fn matches(&self, request: &Request) -> bool {
        request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| {
                v.starts_with(r#"Digest username="admin""#)
                    && v.contains(&format!("nc={}", self.0))
                    && v.contains(r#"nonce="a1b2c3""#)
                    && v.contains(r#"opaque="0p4q""#)
            })
    }
}

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&format!("{}/api/sonicos", server.uri())).unwrap();
    let client = RestClient::with_client(
        reqwest::Client::new(),
        base,
        "admin".into(),
        SecretString::from("password".to_owned()),
    );
    (server, client)
}

async fn mount_handshake(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/sonicos/auth"))
        .and(Anonymous)
        .respond_with(
            ResponseTemplate::new(401)
                .append_header("WWW-Authenticate", SHA_CHALLENGE)
                .append_header("WWW-Authenticate", MD5_CHALLENGE),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/sonicos/auth"))
        .and(DigestWithNonceCount("00000001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": { "success": true } })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/sonicos/reporting/interfaces/ipv4/status"))
        .and(DigestWithNonceCount("00000002"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn wanted(list: &str) -> WantedInterfaces {
    WantedInterfaces::parse_list(list)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_filters_to_wanted_interfaces() {
    let (server, client) = setup().await;
    mount_handshake(&server).await;
    mount_status(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([
            { "name": "X0", "status": "1 Gbps Full Duplex - Up", "ip": "192.168.168.168" },
            { "name": "X1", "status": "1 Gbps Full Duplex - Up", "ip": "203.0.113.10",
              "mask": "255.255.255.0", "link_speed": "1 Gbps", "ip_mode": "Static",
              "zone": "WAN", "comment": "Primary ISP" },
            { "name": "x2", "status": "No link", "ip": "0.0.0.0" },
        ])),
    )
    .await;

    let interfaces = client.fetch_interfaces(&wanted("X1,X2")).await.unwrap();

    assert_eq!(interfaces.len(), 2);
    assert_eq!(interfaces[0].name, "X1");
    assert_eq!(interfaces[0].ip_address.as_deref(), Some("203.0.113.10"));
    assert_eq!(interfaces[0].comment.as_deref(), Some("Primary ISP"));
    assert_eq!(interfaces[1].name, "X2");
    assert_eq!(interfaces[1].status.as_deref(), Some("No link"));
}

#[tokio::test]
async fn test_fetch_accepts_wrapped_payload() {
    let (server, client) = setup().await;
    mount_handshake(&server).await;
    mount_status(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "interfaces": [{ "interface": "X1", "link_status": "Up" }]
        })),
    )
    .await;

    let interfaces = client.fetch_interfaces(&wanted("X1")).await.unwrap();
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].status.as_deref(), Some("Up"));
}

#[tokio::test]
async fn test_unexpected_shape_yields_empty_list() {
    let (server, client) = setup().await;
    mount_handshake(&server).await;
    mount_status(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })),
    )
    .await;

    let interfaces = client.fetch_interfaces(&wanted("X1")).await.unwrap();
    assert!(interfaces.is_empty());
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_md5_challenge_is_challenge_error() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/sonicos/auth"))
        .respond_with(ResponseTemplate::new(401).append_header("WWW-Authenticate", SHA_CHALLENGE))
        .mount(&server)
        .await;

    let err = client.fetch_interfaces(&wanted("X1")).await.unwrap_err();
    assert!(matches!(err, Error::Challenge { .. }), "{err}");
}

#[tokio::test]
async fn test_rejected_credentials_is_authentication_error() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/sonicos/auth"))
        .and(Anonymous)
        .respond_with(ResponseTemplate::new(401).append_header("WWW-Authenticate", MD5_CHALLENGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sonicos/auth"))
        .and(DigestWithNonceCount("00000001"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = client.fetch_interfaces(&wanted("X1")).await.unwrap_err();
    assert!(err.is_auth_failure());
    assert!(err.to_string().contains("401"), "{err}");
}

#[tokio::test]
async fn test_status_server_error_is_api_error() {
    let (server, client) = setup().await;
    mount_handshake(&server).await;
    mount_status(&server, ResponseTemplate::new(503).set_body_string("busy")).await;

    let err = client.fetch_interfaces(&wanted("X1")).await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "busy");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_deserialization_error() {
    let (server, client) = setup().await;
    mount_handshake(&server).await;
    mount_status(&server, ResponseTemplate::new(200).set_body_string("<html>login</html>")).await;

    let err = client.fetch_interfaces(&wanted("X1")).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>login</html>"),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}
