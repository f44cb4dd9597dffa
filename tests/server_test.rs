use abyss::http::ProxyClient;
use abyss::server::{AppState, router};
use abyss::workspace::WorkspaceStorage;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(dir: &TempDir) -> Router {
    let state = AppState::new(
        ProxyClient::new().unwrap(),
        WorkspaceStorage::in_dir(dir.path()),
    );
    router(state, None)
}

fn json_request(method: Method, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_preflight_on_any_path() {
    let dir = TempDir::new().unwrap();
    for uri in ["/api/proxy", "/api/workspace", "/anything/else"] {
        let response = app(&dir)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET, POST, PUT, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    }
}

#[tokio::test]
async fn test_workspace_starts_empty_and_round_trips() {
    let dir = TempDir::new().unwrap();

    let response = app(&dir)
        .oneshot(Request::get("/api/workspace").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(body_json(response).await, json!({}));

    let doc = json!({
        "collections": [],
        "history": [],
        "settings": {"maxHistoryEntries": 10}
    });
    let response = app(&dir)
        .oneshot(json_request(Method::PUT, "/api/workspace", doc.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"ok": true}));

    let response = app(&dir)
        .oneshot(Request::get("/api/workspace").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await, doc);
}

#[tokio::test]
async fn test_unreadable_workspace_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    // A directory where the workspace file should be.
    fs::create_dir(dir.path().join("workspace.json")).unwrap();

    let response = app(&dir)
        .oneshot(Request::get("/api/workspace").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({}));
}

#[tokio::test]
async fn test_malformed_workspace_put_is_rejected() {
    let dir = TempDir::new().unwrap();

    let response = app(&dir)
        .oneshot(json_request(Method::PUT, "/api/workspace", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
    assert!(!dir.path().join("workspace.json").exists());
}

#[tokio::test]
async fn test_workspace_put_write_failure_is_500() {
    let dir = TempDir::new().unwrap();
    // A file where the workspace directory should be.
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "").unwrap();

    let state = AppState::new(ProxyClient::new().unwrap(), WorkspaceStorage::in_dir(&blocker));
    let response = router(state, None)
        .oneshot(json_request(Method::PUT, "/api/workspace", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_proxy_endpoint() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let payload = json!({"url": format!("{}/ping", mock_server.uri()), "method": "GET"});
    let response = app(&dir)
        .oneshot(json_request(Method::POST, "/api/proxy", payload.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["status"], 200);
    assert_eq!(result["statusText"], "OK");
    assert_eq!(result["body"], "pong");
    assert_eq!(result["size"], 4);
    assert!(result["latencyMs"].is_u64());
    assert!(result.get("error").is_none());
}

#[tokio::test]
async fn test_proxy_validation_is_reported_in_envelope() {
    let dir = TempDir::new().unwrap();
    let payload = json!({"url": "ftp://example.com", "method": "GET"});
    let response = app(&dir)
        .oneshot(json_request(Method::POST, "/api/proxy", payload.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["status"], 0);
    assert_eq!(result["statusText"], "Invalid Protocol");
}

#[tokio::test]
async fn test_proxy_rejects_bad_payloads() {
    let dir = TempDir::new().unwrap();

    let response = app(&dir)
        .oneshot(json_request(Method::POST, "/api/proxy", "nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app(&dir)
        .oneshot(json_request(Method::POST, "/api/proxy", r#"{"method":"GET"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Missing required field: url"})
    );
}

#[tokio::test]
async fn test_static_bundle_with_index_fallback() {
    let bundle = TempDir::new().unwrap();
    fs::write(bundle.path().join("index.html"), "<html>app</html>").unwrap();
    fs::write(bundle.path().join("app.js"), "console.log(1)").unwrap();

    let dir = TempDir::new().unwrap();
    let state = AppState::new(ProxyClient::new().unwrap(), WorkspaceStorage::in_dir(dir.path()));
    let app = router(state, Some(bundle.path()));

    let response = app
        .clone()
        .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"console.log(1)");

    let response = app
        .oneshot(Request::get("/collections/123").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<html>app</html>");
}

#[tokio::test]
async fn test_no_bundle_is_404() {
    let dir = TempDir::new().unwrap();
    let response = app(&dir)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
