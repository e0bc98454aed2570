// ABOUTME: Integration tests for request signing through the HTTP client.
// ABOUTME: Uses a wiremock server to check exactly what reaches the wire.

use ollama_auth::{AuthError, Headers, RequestSigner, SigningPolicy, Token};
use ollama_client::{Client, ClientError};
use reqwest::Method;
use ssh_key::{Algorithm, LineEnding, PrivateKey};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_key(dir: &TempDir) -> (PathBuf, [u8; 32]) {
    let key = PrivateKey::random(&mut rand::thread_rng(), Algorithm::Ed25519)
        .expect("should generate ed25519 key");
    let key_path = dir.path().join("id_ed25519");
    std::fs::write(
        &key_path,
        key.to_openssh(LineEnding::LF)
            .expect("should serialize key")
            .as_bytes(),
    )
    .expect("should write key");

    let public: [u8; 32] = match key.public_key().key_data() {
        ssh_key::public::KeyData::Ed25519(ed) => *ed.as_ref(),
        _ => panic!("expected ed25519 key"),
    };
    (key_path, public)
}

fn client_for(server: &MockServer, signer: RequestSigner) -> Client {
    Client::with_signer(reqwest::Client::new(), server.uri(), signer)
}

#[tokio::test]
async fn test_forced_signing_reaches_server_with_valid_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(query_param("model", "llama3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"models":[]}"#))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("should create temp dir");
    let (key_path, public) = write_key(&temp_dir);
    let signer = RequestSigner::new(SigningPolicy::from_flag(Some("1"))).with_key_path(key_path);
    let client = client_for(&server, signer);

    client
        .get("/api/tags?model=llama3")
        .await
        .expect("request should succeed");

    let requests = server.received_requests().await.expect("should record");
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let query = request.url.query().expect("should have query");
    let (existing, ts) = query.split_once("&ts=").expect("ts should be appended last");
    assert_eq!(existing, "model=llama3");
    ts.parse::<i64>().expect("ts should be an integer");

    let token = request
        .headers
        .get("authorization")
        .expect("should have authorization")
        .to_str()
        .expect("should be ascii");
    assert_eq!(token.matches(':').count(), 1);

    let token = Token::parse(token).expect("should parse token");
    assert_eq!(token.public_key, public);
    token
        .verify(format!("GET,/api/tags?model=llama3&ts={ts}").as_bytes())
        .expect("signature should verify");
}

#[tokio::test]
async fn test_server_verifies_path_needing_normalization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("should create temp dir");
    let (key_path, _) = write_key(&temp_dir);
    let signer = RequestSigner::new(SigningPolicy::new(true)).with_key_path(key_path);
    let client = client_for(&server, signer);

    for target in ["/api/my model", "/api/./tags"] {
        client.get(target).await.expect("request should succeed");
    }

    let requests = server.received_requests().await.expect("should record");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.path(), "/api/my%20model");
    assert_eq!(requests[1].url.path(), "/api/tags");

    for request in &requests {
        let challenge = format!(
            "GET,{}?{}",
            request.url.path(),
            request.url.query().expect("should have query")
        );
        let token = request.headers["authorization"]
            .to_str()
            .expect("should be ascii");
        Token::parse(token)
            .expect("should parse token")
            .verify(challenge.as_bytes())
            .expect("server-side challenge should verify");
    }
}

#[tokio::test]
async fn test_unsigned_request_is_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("should create temp dir");
    // No key on disk: an unsigned request must not need one.
    let signer = RequestSigner::new(SigningPolicy::default())
        .with_key_path(temp_dir.path().join("id_ed25519"));
    let client = client_for(&server, signer);

    client
        .get("/api/version")
        .await
        .expect("request should succeed");

    let requests = server.received_requests().await.expect("should record");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query().is_none());
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_absolute_url_bypasses_signing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("should create temp dir");
    let (key_path, _) = write_key(&temp_dir);
    let signer = RequestSigner::new(SigningPolicy::new(true)).with_key_path(key_path);
    let client = Client::with_signer(reqwest::Client::new(), "https://ollama.com", signer);

    client
        .get(&format!("{}/api/version", server.uri()))
        .await
        .expect("request should succeed");

    let requests = server.received_requests().await.expect("should record");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query().is_none());
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_missing_key_fails_before_sending() {
    let server = MockServer::start().await;

    let temp_dir = TempDir::new().expect("should create temp dir");
    let signer = RequestSigner::new(SigningPolicy::new(true))
        .with_key_path(temp_dir.path().join("id_ed25519"));
    let client = client_for(&server, signer);

    let err = client.get("/api/tags").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Auth(AuthError::KeyNotFound { .. })
    ));

    let requests = server.received_requests().await.expect("should record");
    assert!(requests.is_empty(), "nothing should be sent unsigned");
}

#[tokio::test]
async fn test_post_json_signs_method_and_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("should create temp dir");
    let (key_path, _) = write_key(&temp_dir);
    let signer = RequestSigner::new(SigningPolicy::new(true)).with_key_path(key_path);
    let client = client_for(&server, signer);

    let body = serde_json::json!({"model": "llama3", "messages": []});
    client
        .post_json("/api/chat", &body)
        .await
        .expect("request should succeed");

    let requests = server.received_requests().await.expect("should record");
    let request = &requests[0];
    let query = request.url.query().expect("should have query");
    assert!(query.starts_with("ts="));

    let token = request.headers["authorization"]
        .to_str()
        .expect("should be ascii");
    Token::parse(token)
        .expect("should parse token")
        .verify(format!("POST,/api/chat?{query}").as_bytes())
        .expect("signature should verify");

    let sent: serde_json::Value =
        serde_json::from_slice(&request.body).expect("body should be json");
    assert_eq!(sent["model"], "llama3");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let client = client_for(&server, RequestSigner::default());
    let err = client
        .request_raw(Method::GET, "/api/tags", &Headers::new())
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_maps_to_connection_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("should bind");
    let addr = listener.local_addr().expect("should have address");
    drop(listener);

    let client = Client::with_signer(
        reqwest::Client::new(),
        format!("http://{addr}"),
        RequestSigner::default(),
    );
    let err = client.get("/api/tags").await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(_)));
    assert!(err.to_string().contains("Failed to connect to Ollama"));
}
