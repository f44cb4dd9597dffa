pub mod document;
pub mod model;
pub mod storage;

pub use document::{parse_document, to_document};
pub use model::{
    AppSettings, Collection, CollectionFolder, EnvVariable, Environment, HeaderEntry,
    HistoryEntry, RequestTab, ResponseSummary, SavedRequest, SharedWorkspace, WorkspaceState,
    generate_id, now_millis,
};
pub use storage::WorkspaceStorage;
