use tokio::sync::watch;
use tracing::trace;

use crate::store::action::Action;
use crate::store::reducer::reduce;
use crate::workspace::{HistoryEntry, RequestTab, WorkspaceState};

/// Owner of the client's workspace state.
///
/// Constructed explicitly and shared by reference (usually behind an `Arc`).
/// Transitions are applied one at a time; subscribers only hear about
/// transitions that actually changed something.
pub struct Store {
    state: watch::Sender<WorkspaceState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(WorkspaceState::default())
    }
}

impl Store {
    pub fn new(initial: WorkspaceState) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    /// Apply `action`. Returns whether the state changed.
    pub fn dispatch(&self, action: Action) -> bool {
        self.state.send_if_modified(|current| {
            let next = reduce(current.clone(), action);
            if next == *current {
                return false;
            }
            *current = next;
            true
        })
    }

    /// A consistent copy of the current state.
    pub fn snapshot(&self) -> WorkspaceState {
        self.state.borrow().clone()
    }

    /// Receiver that is marked changed after every effective transition.
    pub fn subscribe(&self) -> watch::Receiver<WorkspaceState> {
        self.state.subscribe()
    }

    pub fn active_tab(&self) -> RequestTab {
        let state = self.state.borrow();
        // The reducer keeps the active id valid; the fallback covers a state
        // handed to `Store::new` that was not.
        state
            .active_tab()
            .or_else(|| state.tabs.first())
            .cloned()
            .unwrap_or_else(RequestTab::blank)
    }

    pub fn add_history(&self, entry: HistoryEntry) {
        trace!("recording history entry {}", entry.id);
        self.dispatch(Action::AddHistory { entry });
    }
}
