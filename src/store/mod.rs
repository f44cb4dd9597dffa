pub mod action;
pub mod reducer;
pub mod workspace_store;

pub use action::{Action, SettingsUpdate, TabUpdate, VariableUpdate};
pub use reducer::reduce;
pub use workspace_store::Store;
