use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;

use crate::Result;
use crate::error::AbyssError;
use crate::workspace::WorkspaceStorage;

/// Where the workspace document lives.
///
/// The document is opaque: `read` returns `None` when nothing has been stored
/// yet (including a stored `{}`), and `replace` overwrites the whole thing.
pub trait WorkspaceRemote: Send + Sync + 'static {
    fn read(&self) -> impl Future<Output = Result<Option<Value>>> + Send;

    fn replace(&self, doc: &Value) -> impl Future<Output = Result<()>> + Send;
}

fn non_empty(doc: Value) -> Option<Value> {
    match &doc {
        Value::Object(map) if map.is_empty() => None,
        _ => Some(doc),
    }
}

impl WorkspaceRemote for WorkspaceStorage {
    async fn read(&self) -> Result<Option<Value>> {
        let storage = self.clone();
        let doc = tokio::task::spawn_blocking(move || storage.read())
            .await
            .map_err(|e| AbyssError::Other(format!("workspace read task failed: {}", e)))??;
        Ok(doc.and_then(non_empty))
    }

    async fn replace(&self, doc: &Value) -> Result<()> {
        let storage = self.clone();
        let doc = doc.clone();
        tokio::task::spawn_blocking(move || storage.replace(&doc))
            .await
            .map_err(|e| AbyssError::Other(format!("workspace write task failed: {}", e)))?
    }
}

/// The workspace endpoint of a running `abyss dev` server.
#[derive(Clone)]
pub struct HttpWorkspace {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpWorkspace {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:4567`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/workspace", base_url.trim_end_matches('/')),
        }
    }
}

impl WorkspaceRemote for HttpWorkspace {
    async fn read(&self) -> Result<Option<Value>> {
        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AbyssError::RemoteError(format!(
                "GET {} returned {}",
                self.endpoint, status
            )));
        }
        let doc: Value = response.json().await?;
        Ok(non_empty(doc))
    }

    async fn replace(&self, doc: &Value) -> Result<()> {
        let response = self.client.put(&self.endpoint).json(doc).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AbyssError::RemoteError(format!(
                "PUT {} returned {}",
                self.endpoint, status
            )));
        }
        debug!("workspace pushed to {}", self.endpoint);
        Ok(())
    }
}

/// In-process remote. Clones share the same document.
#[derive(Clone, Default)]
pub struct MemoryWorkspace {
    doc: Arc<Mutex<Option<Value>>>,
    failing: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: Value) -> Self {
        let remote = Self::default();
        remote.set_document(doc);
        remote
    }

    pub fn document(&self) -> Option<Value> {
        self.lock().clone()
    }

    /// Overwrite the stored document as another client would.
    pub fn set_document(&self, doc: Value) {
        *self.lock() = Some(doc);
    }

    /// Make every subsequent call fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful `replace` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Value>> {
        self.doc.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AbyssError::RemoteError("workspace unavailable".to_string()));
        }
        Ok(())
    }
}

impl WorkspaceRemote for MemoryWorkspace {
    async fn read(&self) -> Result<Option<Value>> {
        self.check()?;
        Ok(self.document().and_then(non_empty))
    }

    async fn replace(&self, doc: &Value) -> Result<()> {
        self.check()?;
        self.set_document(doc.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
