//! Keeping the client's workspace and the persisted document in step.

pub mod controller;
pub mod remote;
pub mod status;

pub use controller::{SyncController, SyncHandle};
pub use remote::{HttpWorkspace, MemoryWorkspace, WorkspaceRemote};
pub use status::SyncStatus;
