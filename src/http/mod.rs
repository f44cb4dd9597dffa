pub mod client;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use client::ProxyClient;
pub use request::ProxyRequest;
pub use response::ProxyResult;
pub use types::HttpMethod;
