//! Conversion between the opaque JSON document the server stores and the
//! typed workspace the client works with.
//!
//! Parsing is lenient: a document written by an older or different client
//! must never prevent hydration, so each shared field that is missing or
//! malformed falls back to its default on its own. In list fields only the
//! malformed entries are dropped.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::Result;
use crate::workspace::model::{SharedWorkspace, WorkspaceState};

/// Typed view of a stored document. `None` means "no workspace yet":
/// an empty object or anything that is not an object.
pub fn parse_document(doc: &Value) -> Option<SharedWorkspace> {
    let obj = doc.as_object()?;
    if obj.is_empty() {
        return None;
    }

    Some(SharedWorkspace {
        collections: list(obj, "collections"),
        environments: list(obj, "environments"),
        active_environment_id: field(obj, "activeEnvironmentId"),
        history: list(obj, "history"),
        settings: field(obj, "settings"),
    })
}

/// The full document pushed to the server, client-local tabs included.
pub fn to_document(state: &WorkspaceState) -> Result<Value> {
    Ok(serde_json::to_value(state)?)
}

fn field<T: DeserializeOwned + Default>(obj: &Map<String, Value>, key: &str) -> T {
    match obj.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Ignoring malformed workspace field `{}`: {}", key, e);
            T::default()
        }),
    }
}

fn list<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Vec<T> {
    let items = match obj.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            warn!("Ignoring workspace field `{}`: not an array", key);
            return Vec::new();
        }
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            serde_json::from_value(item.clone())
                .inspect_err(|e| warn!("Dropping malformed `{}[{}]`: {}", key, i, e))
                .ok()
        })
        .collect()
}
