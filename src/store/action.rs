use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;
use crate::workspace::{EnvVariable, HeaderEntry, HistoryEntry, SavedRequest, SharedWorkspace};

/// Every state transition the workspace supports.
///
/// On the wire an action is an object tagged by `type`
/// (`{"type": "CLOSE_TAB", "tabId": "..."}`); an unrecognized `type`
/// becomes [`Action::Unknown`], which leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    AddTab,
    CloseTab {
        tab_id: String,
    },
    SetActiveTab {
        tab_id: String,
    },
    UpdateTab {
        tab_id: String,
        updates: TabUpdate,
    },

    AddHistory {
        entry: HistoryEntry,
    },
    ClearHistory,
    LoadFromHistory {
        entry: HistoryEntry,
    },
    UpdateSettings {
        updates: SettingsUpdate,
    },
    ClearData,

    // Collections
    CreateCollection {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
    DeleteCollection {
        collection_id: String,
    },
    RenameCollection {
        collection_id: String,
        name: String,
    },
    AddRequestToCollection {
        collection_id: String,
        #[serde(default)]
        folder_id: Option<String>,
        request: SavedRequest,
    },
    RemoveRequestFromCollection {
        collection_id: String,
        #[serde(default)]
        folder_id: Option<String>,
        request_id: String,
    },
    CreateFolder {
        collection_id: String,
        name: String,
    },
    DeleteFolder {
        collection_id: String,
        folder_id: String,
    },
    ToggleFolder {
        collection_id: String,
        folder_id: String,
    },
    LoadFromCollection {
        request: SavedRequest,
    },

    // Environments
    CreateEnvironment {
        name: String,
    },
    DeleteEnvironment {
        environment_id: String,
    },
    RenameEnvironment {
        environment_id: String,
        name: String,
    },
    DuplicateEnvironment {
        environment_id: String,
    },
    SetActiveEnvironment {
        environment_id: Option<String>,
    },
    AddVariable {
        environment_id: String,
        variable: EnvVariable,
    },
    DeleteVariable {
        environment_id: String,
        variable_id: String,
    },
    UpdateVariable {
        environment_id: String,
        variable_id: String,
        updates: VariableUpdate,
    },

    // Server sync
    HydrateFromServer {
        server_state: Box<SharedWorkspace>,
    },

    #[serde(other)]
    Unknown,
}

/// Partial update of a tab; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<HeaderEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl TabUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_history_entries: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VariableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_tagged_action() {
        let action: Action = serde_json::from_value(json!({
            "type": "CLOSE_TAB",
            "tabId": "t1"
        }))
        .unwrap();
        assert_eq!(
            action,
            Action::CloseTab {
                tab_id: "t1".to_string()
            }
        );
    }

    #[test]
    fn test_optional_folder_id() {
        let action: Action = serde_json::from_value(json!({
            "type": "REMOVE_REQUEST_FROM_COLLECTION",
            "collectionId": "c1",
            "requestId": "r1"
        }))
        .unwrap();
        assert!(matches!(
            action,
            Action::RemoveRequestFromCollection { folder_id: None, .. }
        ));
    }

    #[test]
    fn test_unknown_type_maps_to_unknown() {
        let action: Action = serde_json::from_value(json!({ "type": "DO_A_BARREL_ROLL" })).unwrap();
        assert_eq!(action, Action::Unknown);
    }

    #[test]
    fn test_unit_action_serialization() {
        let json = serde_json::to_value(Action::AddTab).unwrap();
        assert_eq!(json, json!({ "type": "ADD_TAB" }));
    }
}
