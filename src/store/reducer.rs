//! The workspace state machine.
//!
//! `reduce` is the only place application state changes. It never panics:
//! actions aimed at ids that do not exist, and [`Action::Unknown`], return the
//! state unchanged.

use crate::http::HttpMethod;
use crate::store::action::{Action, SettingsUpdate, TabUpdate, VariableUpdate};
use crate::utils::url::derive_tab_name;
use crate::workspace::{
    Collection, CollectionFolder, Environment, HeaderEntry, RequestTab, SavedRequest,
    SharedWorkspace, WorkspaceState, generate_id, now_millis,
};

pub fn reduce(mut state: WorkspaceState, action: Action) -> WorkspaceState {
    match action {
        Action::AddTab => {
            let tab = RequestTab::blank();
            state.active_tab_id = tab.id.clone();
            state.tabs.push(tab);
        }

        Action::CloseTab { tab_id } => close_tab(&mut state, &tab_id),

        Action::SetActiveTab { tab_id } => {
            if state.tabs.iter().any(|t| t.id == tab_id) {
                state.active_tab_id = tab_id;
            }
        }

        Action::UpdateTab { tab_id, updates } => {
            if let Some(tab) = state.tabs.iter_mut().find(|t| t.id == tab_id) {
                apply_tab_update(tab, updates);
            }
        }

        Action::AddHistory { entry } => {
            state.history.insert(0, entry);
            state.history.truncate(state.settings.max_history_entries);
        }

        Action::ClearHistory => state.history.clear(),

        Action::LoadFromHistory { entry } => {
            let name = derive_tab_name(&entry.url, entry.method);
            load_into_requester(&mut state, name, entry.method, entry.url, entry.headers, entry.body);
        }

        Action::UpdateSettings { updates } => update_settings(&mut state, updates),

        Action::ClearData => state = WorkspaceState::default(),

        Action::CreateCollection { name, description } => {
            let now = now_millis();
            state.collections.push(Collection {
                id: generate_id(),
                name,
                description: description.unwrap_or_default(),
                folders: Vec::new(),
                requests: Vec::new(),
                created_at: now,
                updated_at: now,
            });
        }

        Action::DeleteCollection { collection_id } => {
            state.collections.retain(|c| c.id != collection_id);
        }

        Action::RenameCollection {
            collection_id,
            name,
        } => {
            if let Some(collection) = collection_mut(&mut state, &collection_id) {
                collection.name = name;
                collection.touch();
            }
        }

        Action::AddRequestToCollection {
            collection_id,
            folder_id,
            request,
        } => {
            if let Some(collection) = collection_mut(&mut state, &collection_id) {
                match folder_id {
                    Some(folder_id) => {
                        if let Some(folder) = collection.folder_mut(&folder_id) {
                            folder.requests.push(request);
                            collection.touch();
                        }
                    }
                    None => {
                        collection.requests.push(request);
                        collection.touch();
                    }
                }
            }
        }

        Action::RemoveRequestFromCollection {
            collection_id,
            folder_id,
            request_id,
        } => {
            if let Some(collection) = collection_mut(&mut state, &collection_id) {
                let removed = match folder_id {
                    Some(folder_id) => collection
                        .folder_mut(&folder_id)
                        .is_some_and(|folder| remove_request(&mut folder.requests, &request_id)),
                    None => remove_request(&mut collection.requests, &request_id),
                };
                if removed {
                    collection.touch();
                }
            }
        }

        Action::CreateFolder {
            collection_id,
            name,
        } => {
            if let Some(collection) = collection_mut(&mut state, &collection_id) {
                collection.folders.push(CollectionFolder {
                    id: generate_id(),
                    name,
                    requests: Vec::new(),
                    expanded: true,
                });
                collection.touch();
            }
        }

        Action::DeleteFolder {
            collection_id,
            folder_id,
        } => {
            if let Some(collection) = collection_mut(&mut state, &collection_id) {
                let before = collection.folders.len();
                collection.folders.retain(|f| f.id != folder_id);
                if collection.folders.len() != before {
                    collection.touch();
                }
            }
        }

        Action::ToggleFolder {
            collection_id,
            folder_id,
        } => {
            if let Some(collection) = collection_mut(&mut state, &collection_id)
                && let Some(folder) = collection.folder_mut(&folder_id)
            {
                folder.expanded = !folder.expanded;
                collection.touch();
            }
        }

        Action::LoadFromCollection { request } => {
            let SavedRequest {
                name,
                method,
                url,
                headers,
                body,
                ..
            } = request;
            load_into_requester(&mut state, name, method, url, headers, body);
        }

        Action::CreateEnvironment { name } => {
            state.environments.push(Environment {
                id: generate_id(),
                name,
                variables: Vec::new(),
                created_at: now_millis(),
            });
        }

        Action::DeleteEnvironment { environment_id } => {
            state.environments.retain(|e| e.id != environment_id);
            if state.active_environment_id.as_deref() == Some(environment_id.as_str()) {
                state.active_environment_id = None;
            }
        }

        Action::RenameEnvironment {
            environment_id,
            name,
        } => {
            if let Some(env) = environment_mut(&mut state, &environment_id) {
                env.name = name;
            }
        }

        Action::DuplicateEnvironment { environment_id } => {
            if let Some(source) = state.environments.iter().find(|e| e.id == environment_id) {
                let mut copy = source.clone();
                copy.id = generate_id();
                copy.name = format!("{} (Copy)", source.name);
                copy.created_at = now_millis();
                for variable in &mut copy.variables {
                    variable.id = generate_id();
                }
                state.environments.push(copy);
            }
        }

        Action::SetActiveEnvironment { environment_id } => match environment_id {
            None => state.active_environment_id = None,
            Some(id) => {
                if state.environments.iter().any(|e| e.id == id) {
                    state.active_environment_id = Some(id);
                }
            }
        },

        Action::AddVariable {
            environment_id,
            variable,
        } => {
            if let Some(env) = environment_mut(&mut state, &environment_id) {
                env.variables.push(variable);
            }
        }

        Action::DeleteVariable {
            environment_id,
            variable_id,
        } => {
            if let Some(env) = environment_mut(&mut state, &environment_id) {
                env.variables.retain(|v| v.id != variable_id);
            }
        }

        Action::UpdateVariable {
            environment_id,
            variable_id,
            updates,
        } => {
            if let Some(env) = environment_mut(&mut state, &environment_id)
                && let Some(variable) = env.variables.iter_mut().find(|v| v.id == variable_id)
            {
                let VariableUpdate {
                    key,
                    value,
                    secret,
                    active,
                } = updates;
                if let Some(key) = key {
                    variable.key = key;
                }
                if let Some(value) = value {
                    variable.value = value;
                }
                if let Some(secret) = secret {
                    variable.secret = secret;
                }
                if let Some(active) = active {
                    variable.active = active;
                }
            }
        }

        Action::HydrateFromServer { server_state } => hydrate(&mut state, *server_state),

        Action::Unknown => {}
    }

    state
}

/// The last tab is never closed. Closing the active tab activates whichever
/// tab ends up last, not the closed tab's neighbour.
fn close_tab(state: &mut WorkspaceState, tab_id: &str) {
    if state.tabs.len() <= 1 {
        return;
    }
    state.tabs.retain(|t| t.id != tab_id);
    if state.active_tab_id == tab_id
        && let Some(last) = state.tabs.last()
    {
        state.active_tab_id = last.id.clone();
    }
}

fn apply_tab_update(tab: &mut RequestTab, updates: TabUpdate) {
    let TabUpdate {
        name,
        method,
        url,
        headers,
        body,
    } = updates;
    if let Some(name) = name {
        tab.name = name;
    }
    if let Some(method) = method {
        tab.method = method;
    }
    if let Some(url) = url {
        tab.url = url;
    }
    if let Some(headers) = headers {
        tab.headers = headers;
    }
    if let Some(body) = body {
        tab.body = body;
    }
}

/// Fill the active tab when it has no URL yet, otherwise open a new tab.
fn load_into_requester(
    state: &mut WorkspaceState,
    name: String,
    method: HttpMethod,
    url: String,
    headers: Vec<HeaderEntry>,
    body: String,
) {
    let active_id = state.active_tab_id.clone();
    if let Some(tab) = state
        .tabs
        .iter_mut()
        .find(|t| t.id == active_id && t.url.is_empty())
    {
        tab.name = name;
        tab.method = method;
        tab.url = url;
        tab.headers = headers;
        tab.body = body;
        return;
    }

    let tab = RequestTab {
        id: generate_id(),
        name,
        method,
        url,
        headers,
        body,
    };
    state.active_tab_id = tab.id.clone();
    state.tabs.push(tab);
}

fn update_settings(state: &mut WorkspaceState, updates: SettingsUpdate) {
    if let Some(max) = updates.max_history_entries {
        state.settings.max_history_entries = max;
        state.history.truncate(max);
    }
}

/// Shared fields come from the server wholesale; tabs never do.
fn hydrate(state: &mut WorkspaceState, server: SharedWorkspace) {
    let SharedWorkspace {
        collections,
        environments,
        active_environment_id,
        history,
        settings,
    } = server;

    state.collections = collections;
    state.environments = environments;
    state.history = history;
    state.settings = settings;
    state.history.truncate(state.settings.max_history_entries);
    state.active_environment_id = active_environment_id
        .filter(|id| state.environments.iter().any(|e| &e.id == id));
}

fn collection_mut<'a>(state: &'a mut WorkspaceState, id: &str) -> Option<&'a mut Collection> {
    state.collections.iter_mut().find(|c| c.id == id)
}

fn environment_mut<'a>(state: &'a mut WorkspaceState, id: &str) -> Option<&'a mut Environment> {
    state.environments.iter_mut().find(|e| e.id == id)
}

fn remove_request(requests: &mut Vec<SavedRequest>, request_id: &str) -> bool {
    let before = requests.len();
    requests.retain(|r| r.id != request_id);
    requests.len() != before
}
