pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod requester;
pub mod server;
pub mod store;
pub mod sync;
pub mod utils;
pub mod variable;
pub mod workspace;

// Re-export commonly used types
pub use error::{AbyssError, Result};
