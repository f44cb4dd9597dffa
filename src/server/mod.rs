//! The local HTTP surface: request proxy, workspace document, client bundle.

pub mod handlers;

use std::path::Path;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::Result;
use crate::config::Config;
use crate::http::ProxyClient;
use crate::workspace::WorkspaceStorage;

const ALLOW_METHODS: &str = "GET, POST, PUT, OPTIONS";

#[derive(Clone)]
pub struct AppState {
    pub proxy: ProxyClient,
    pub storage: WorkspaceStorage,
}

impl AppState {
    pub fn new(proxy: ProxyClient, storage: WorkspaceStorage) -> Self {
        Self { proxy, storage }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            ProxyClient::with_timeout(config.proxy.timeout())?,
            WorkspaceStorage::in_dir(&config.workspace.dir),
        ))
    }
}

/// All routes. Paths outside `/api` are served from `static_dir`, with
/// unknown paths answered by its `index.html`.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/api/proxy", post(handlers::proxy))
        .route(
            "/api/workspace",
            get(handlers::get_workspace).put(handlers::put_workspace),
        )
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => api.fallback(handlers::not_found),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    app.layer(cors)
        .layer(middleware::from_fn(preflight))
        .layer(TraceLayer::new_for_http())
}

/// Every `OPTIONS` request is a successful preflight, whatever the path.
async fn preflight(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    config.validate()?;
    let addr = config.bind_addr()?;
    let state = AppState::from_config(config)?;
    let app = router(state, config.server.static_dir.as_deref());

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    info!("Workspace: {}", config.workspace.dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
