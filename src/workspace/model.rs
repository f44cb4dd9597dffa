use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::{HttpMethod, ProxyResult};

/// History cap applied when no settings were ever saved.
pub const DEFAULT_MAX_HISTORY_ENTRIES: usize = 50;

const ID_LEN: usize = 12;

/// Opaque client-side identifier.
pub fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Wall clock in epoch milliseconds, the unit every persisted timestamp uses.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderEntry {
    pub id: String,
    pub key: String,
    pub value: String,
    pub active: bool,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            key: key.into(),
            value: value.into(),
            active: true,
        }
    }
}

/// An open editor tab. Client-local: never merged from the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestTab {
    pub id: String,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<HeaderEntry>,
    pub body: String,
}

impl RequestTab {
    /// The tab every fresh workspace and every "new tab" starts with.
    pub fn blank() -> Self {
        Self {
            id: generate_id(),
            name: "New Request".to_string(),
            method: HttpMethod::Get,
            url: String::new(),
            headers: vec![HeaderEntry::new("Content-Type", "application/json")],
            body: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavedRequest {
    pub id: String,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<HeaderEntry>,
    pub body: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionFolder {
    pub id: String,
    pub name: String,
    pub requests: Vec<SavedRequest>,
    pub expanded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: String,
    pub folders: Vec<CollectionFolder>,
    pub requests: Vec<SavedRequest>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Collection {
    /// Advance `updated_at`, strictly, even when the clock has not moved.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at.saturating_add(1));
    }

    pub fn folder_mut(&mut self, folder_id: &str) -> Option<&mut CollectionFolder> {
        self.folders.iter_mut().find(|f| f.id == folder_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvVariable {
    pub id: String,
    pub key: String,
    pub value: String,
    pub secret: bool,
    pub active: bool,
}

impl EnvVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            key: key.into(),
            value: value.into(),
            secret: false,
            active: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    pub name: String,
    pub variables: Vec<EnvVariable>,
    pub created_at: i64,
}

/// What history keeps of a proxied response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseSummary {
    pub status: u16,
    pub status_text: String,
    pub latency_ms: u64,
    pub size: u64,
    pub body: String,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ProxyResult> for ResponseSummary {
    fn from(result: &ProxyResult) -> Self {
        Self {
            status: result.status,
            status_text: result.status_text.clone(),
            latency_ms: result.latency_ms,
            size: result.size,
            body: result.body.clone(),
            headers: result.headers.clone(),
            error: result.error.clone(),
        }
    }
}

/// One completed proxy call. Never mutated, only evicted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: i64,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<HeaderEntry>,
    pub body: String,
    pub response: ResponseSummary,
}

impl HistoryEntry {
    /// Record a call made from `tab` against the resolved `url`.
    pub fn record(tab: &RequestTab, url: &str, result: &ProxyResult) -> Self {
        Self {
            id: generate_id(),
            timestamp: now_millis(),
            method: tab.method,
            url: url.to_string(),
            headers: tab.headers.clone(),
            body: tab.body.clone(),
            response: ResponseSummary::from(result),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub max_history_entries: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            max_history_entries: DEFAULT_MAX_HISTORY_ENTRIES,
        }
    }
}

/// The part of the workspace that is persisted and merged across clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SharedWorkspace {
    pub collections: Vec<Collection>,
    pub environments: Vec<Environment>,
    pub active_environment_id: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub settings: AppSettings,
}

/// Everything the client owns. `tabs` and `active_tab_id` stay local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    pub tabs: Vec<RequestTab>,
    pub active_tab_id: String,
    pub history: Vec<HistoryEntry>,
    pub settings: AppSettings,
    pub collections: Vec<Collection>,
    pub environments: Vec<Environment>,
    pub active_environment_id: Option<String>,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        let tab = RequestTab::blank();
        Self {
            active_tab_id: tab.id.clone(),
            tabs: vec![tab],
            history: Vec::new(),
            settings: AppSettings::default(),
            collections: Vec::new(),
            environments: Vec::new(),
            active_environment_id: None,
        }
    }
}

impl WorkspaceState {
    pub fn active_tab(&self) -> Option<&RequestTab> {
        self.tabs.iter().find(|t| t.id == self.active_tab_id)
    }

    pub fn active_environment(&self) -> Option<&Environment> {
        let id = self.active_environment_id.as_deref()?;
        self.environments.iter().find(|e| e.id == id)
    }

    pub fn shared(&self) -> SharedWorkspace {
        SharedWorkspace {
            collections: self.collections.clone(),
            environments: self.environments.clone(),
            active_environment_id: self.active_environment_id.clone(),
            history: self.history.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Whether the fields the poll loop watches differ from `remote`.
    pub fn differs_from(&self, remote: &SharedWorkspace) -> bool {
        self.collections != remote.collections
            || self.environments != remote.environments
            || self.history != remote.history
    }
}
