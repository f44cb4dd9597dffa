use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::store::{Action, Store};
use crate::sync::remote::WorkspaceRemote;
use crate::sync::status::SyncStatus;
use crate::workspace::{WorkspaceState, parse_document, to_document};

/// Keeps a `Store` and a `WorkspaceRemote` in step.
///
/// All remote traffic happens on one task, so a push and a poll never
/// overlap. Local changes are pushed after a quiet period; the remote is
/// polled on a fixed interval and adopted when its shared fields differ.
/// A failed push is retried on the next poll tick instead of polling, so
/// unsaved local edits are never replaced by the remote copy.
pub struct SyncController<R> {
    store: Arc<Store>,
    remote: R,
    debounce: Duration,
    poll_interval: Duration,
    status: watch::Sender<SyncStatus>,
}

/// Owner of a running controller. Dropping it stops the controller without
/// flushing; use [`SyncHandle::shutdown`] to flush first.
pub struct SyncHandle {
    status: watch::Receiver<SyncStatus>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    pub fn current_status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    /// Push any pending change, then stop.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!("sync task ended abnormally: {}", e);
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if self.stop.is_some() {
            self.task.abort();
        }
    }
}

impl<R: WorkspaceRemote> SyncController<R> {
    /// Start syncing `store` with `remote` on the current runtime.
    pub fn spawn(store: Arc<Store>, remote: R, config: &SyncConfig) -> SyncHandle {
        let (status, status_rx) = watch::channel(SyncStatus::Loading);
        let (stop_tx, stop_rx) = oneshot::channel();
        let controller = Self {
            store,
            remote,
            debounce: config.debounce(),
            // `interval` panics on a zero period.
            poll_interval: config.poll_interval().max(Duration::from_millis(1)),
            status,
        };
        let task = tokio::spawn(controller.run(stop_rx));
        SyncHandle {
            status: status_rx,
            stop: Some(stop_tx),
            task,
        }
    }

    async fn run(self, mut stop: oneshot::Receiver<()>) {
        let mut changes = self.store.subscribe();
        let mut hydrated = self.hydrate(&mut changes).await;

        let mut poll = time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Deadline of the pending push, if any.
        let mut pending: Option<Instant> = None;
        // Local state the remote has not accepted yet.
        let mut unsaved = false;

        loop {
            tokio::select! {
                _ = &mut stop => {
                    if pending.is_some() || unsaved {
                        self.push().await;
                    }
                    break;
                }
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    changes.mark_unchanged();
                    if hydrated {
                        pending = Some(Instant::now() + self.debounce);
                    }
                }
                _ = time::sleep_until(pending.unwrap_or_else(Instant::now)), if pending.is_some() => {
                    pending = None;
                    unsaved = !self.push().await;
                }
                _ = poll.tick() => {
                    if !hydrated {
                        hydrated = self.hydrate(&mut changes).await;
                    } else if unsaved && pending.is_none() {
                        unsaved = !self.push().await;
                    } else if pending.is_none() {
                        self.poll(&mut changes).await;
                    }
                }
            }
        }
        debug!("sync controller stopped");
    }

    fn set_status(&self, status: SyncStatus) {
        self.status.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            debug!("sync status: {} -> {}", current, status);
            *current = status;
            true
        });
    }

    /// Adopt the remote document, if any. Returns whether pushing may begin.
    async fn hydrate(&self, changes: &mut watch::Receiver<WorkspaceState>) -> bool {
        match self.remote.read().await {
            Ok(doc) => {
                if let Some(shared) = doc.as_ref().and_then(parse_document) {
                    self.store.dispatch(Action::HydrateFromServer {
                        server_state: Box::new(shared),
                    });
                    info!("Workspace loaded");
                } else {
                    info!("No stored workspace, starting fresh");
                }
                // Neither what was just loaded nor anything edited before it
                // counts as a local change.
                changes.mark_unchanged();
                self.set_status(SyncStatus::Synced);
                true
            }
            Err(e) => {
                warn!("Failed to load workspace: {}", e);
                self.set_status(SyncStatus::Error);
                false
            }
        }
    }

    /// Replace the remote document with local state. Returns whether it was accepted.
    async fn push(&self) -> bool {
        self.set_status(SyncStatus::Syncing);
        let result = match to_document(&self.store.snapshot()) {
            Ok(doc) => self.remote.replace(&doc).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                self.set_status(SyncStatus::Synced);
                true
            }
            Err(e) => {
                warn!("Failed to save workspace: {}", e);
                self.set_status(SyncStatus::Error);
                false
            }
        }
    }

    async fn poll(&self, changes: &mut watch::Receiver<WorkspaceState>) {
        let doc = match self.remote.read().await {
            Ok(Some(doc)) => doc,
            Ok(None) => return,
            Err(e) => {
                debug!("workspace poll failed: {}", e);
                return;
            }
        };
        let Some(shared) = parse_document(&doc) else {
            return;
        };
        // An edit landed while reading; it is pushed after the debounce instead.
        if changes.has_changed().unwrap_or(false) {
            debug!("local change during poll, keeping local state");
            return;
        }
        if !self.store.snapshot().differs_from(&shared) {
            return;
        }

        info!("Workspace changed remotely, reloading");
        self.store.dispatch(Action::HydrateFromServer {
            server_state: Box::new(shared),
        });
        changes.mark_unchanged();
    }
}
