use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::Result;
use crate::error::AbyssError;
use crate::http::{ProxyClient, ProxyRequest, ProxyResult};
use crate::store::{Action, Store, TabUpdate};
use crate::utils::{normalize_url, validate_url};
use crate::variable::{VariableContext, VariableResolver};
use crate::workspace::HistoryEntry;

/// Something that can carry a request to its target and report back.
///
/// `Ok` means the proxy handled the call, whatever its outcome; failures to
/// reach the target are inside the envelope. `Err` means the proxy itself
/// could not be reached.
pub trait Proxy: Send + Sync {
    fn forward(&self, request: ProxyRequest) -> impl Future<Output = Result<ProxyResult>> + Send;
}

impl Proxy for ProxyClient {
    async fn forward(&self, request: ProxyRequest) -> Result<ProxyResult> {
        Ok(self.execute(request).await)
    }
}

/// Proxy reached over HTTP through a running `abyss dev` server.
#[derive(Clone)]
pub struct RemoteProxy {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteProxy {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:4567`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/proxy", base_url.trim_end_matches('/')),
        }
    }

    async fn post(&self, request: &ProxyRequest) -> std::result::Result<ProxyResult, reqwest::Error> {
        self.client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<ProxyResult>()
            .await
    }
}

impl Proxy for RemoteProxy {
    async fn forward(&self, request: ProxyRequest) -> Result<ProxyResult> {
        self.post(&request)
            .await
            .map_err(|e| AbyssError::ProxyUnavailable(format!("{}: {}", self.endpoint, e)))
    }
}

/// The "send" flow: active tab → proxy → history.
pub struct Requester<P> {
    store: Arc<Store>,
    proxy: P,
}

impl<P: Proxy> Requester<P> {
    pub fn new(store: Arc<Store>, proxy: P) -> Self {
        Self { store, proxy }
    }

    /// Send the active tab.
    ///
    /// An unusable URL (after interpolation) is rejected before anything
    /// goes out. Every call the proxy completes renames the tab and lands in
    /// history, failures included. When the proxy itself is unreachable the
    /// caller gets a `Connection failed` envelope and nothing is recorded.
    pub async fn send_active_tab(&self) -> Result<ProxyResult> {
        let tab = self.store.active_tab();
        let context = {
            let state = self.store.snapshot();
            state
                .active_environment()
                .map(VariableContext::from_environment)
                .unwrap_or_default()
        };

        let resolved = VariableResolver::substitute(&tab.url, &context);
        validate_url(&resolved)?;
        let resolved_url = normalize_url(&resolved);
        let mut request = ProxyRequest::new(tab.method.as_str(), &resolved_url);
        for header in tab.headers.iter().filter(|h| h.active) {
            let key = header.key.trim();
            if key.is_empty() {
                continue;
            }
            request = request.with_header(key, &VariableResolver::substitute(&header.value, &context));
        }
        if tab.method.allows_body() && !tab.body.is_empty() {
            request = request.with_body(&VariableResolver::substitute(&tab.body, &context));
        }

        info!("{} {}", tab.method, resolved_url);
        let result = match self.proxy.forward(request).await {
            Ok(result) => result,
            Err(e) => {
                warn!("{}", e);
                return Ok(ProxyResult::network_error("Connection failed"));
            }
        };

        self.store.dispatch(Action::UpdateTab {
            tab_id: tab.id.clone(),
            updates: TabUpdate::name(format!("{} {}", tab.method, normalize_url(&tab.url))),
        });
        self.store
            .add_history(HistoryEntry::record(&tab, &resolved_url, &result));

        Ok(result)
    }
}
