use abyss::http::{ProxyClient, ProxyRequest};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_returns_status_headers_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "abc123")
                .set_body_json(serde_json::json!({"users": [{"id": 1, "name": "Alice"}]})),
        )
        .mount(&mock_server)
        .await;

    let client = ProxyClient::new().unwrap();
    let result = client
        .execute(ProxyRequest::new("GET", &format!("{}/api/users", mock_server.uri())))
        .await;

    assert_eq!(result.status, 200);
    assert_eq!(result.status_text, "OK");
    assert_eq!(result.headers["x-request-id"], "abc123");
    assert!(result.body.contains("Alice"));
    assert_eq!(result.size, result.body.len() as u64);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_get_never_forwards_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = ProxyClient::new().unwrap();
    let result = client
        .execute(ProxyRequest::new("get", &mock_server.uri()).with_body("should not be sent"))
        .await;
    assert_eq!(result.status, 204);
    assert_eq!(result.status_text, "No Content");

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].body.is_empty());
}

#[tokio::test]
async fn test_post_forwards_body_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(header("Content-Type", "application/json"))
        .and(body_string(r#"{"user":"alice"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .mount(&mock_server)
        .await;

    let client = ProxyClient::new().unwrap();
    let request = ProxyRequest::new("POST", &format!("{}/api/login", mock_server.uri()))
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"user":"alice"}"#);
    let result = client.execute(request).await;

    assert_eq!(result.status, 201);
    assert_eq!(result.status_text, "Created");
    assert_eq!(result.body, "created");
}

#[tokio::test]
async fn test_size_counts_utf8_bytes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("héllo"))
        .mount(&mock_server)
        .await;

    let client = ProxyClient::new().unwrap();
    let result = client.execute(ProxyRequest::new("GET", &mock_server.uri())).await;
    assert_eq!(result.body, "héllo");
    assert_eq!(result.size, 6);
}

#[tokio::test]
async fn test_error_status_is_not_an_envelope_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&mock_server)
        .await;

    let client = ProxyClient::new().unwrap();
    let result = client.execute(ProxyRequest::new("DELETE", &mock_server.uri())).await;
    assert_eq!(result.status, 404);
    assert_eq!(result.status_text, "Not Found");
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_validation_failures_are_stable() {
    let client = ProxyClient::new().unwrap();

    for _ in 0..2 {
        let result = client.execute(ProxyRequest::new("GET", "not-a-url")).await;
        assert_eq!(result.status, 0);
        assert_eq!(result.status_text, "Invalid URL");
        assert_eq!(result.error.as_deref(), Some("Invalid URL: not-a-url"));
        assert_eq!(result.latency_ms, 0);

        let result = client.execute(ProxyRequest::new("GET", "ftp://example.com/file")).await;
        assert_eq!(result.status_text, "Invalid Protocol");
        assert_eq!(
            result.error.as_deref(),
            Some("Only HTTP and HTTPS are supported, got: ftp:")
        );
    }

    let result = client.execute(ProxyRequest::default()).await;
    assert_eq!(result.error.as_deref(), Some("Missing required field: url"));
}

#[tokio::test]
async fn test_unreachable_target_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = ProxyClient::new().unwrap();
    let result = client
        .execute(ProxyRequest::new("GET", &format!("http://127.0.0.1:{}/", port)))
        .await;

    assert_eq!(result.status, 0);
    assert_eq!(result.status_text, "Network Error");
    assert!(result.error.is_some_and(|e| !e.is_empty()));
    assert!(result.headers.is_empty());
    assert!(result.body.is_empty());
}
