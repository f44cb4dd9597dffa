use thiserror::Error;

#[derive(Error, Debug)]
pub enum AbyssError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Workspace server error: {0}")]
    RemoteError(String),

    #[error("Proxy server unreachable: {0}")]
    ProxyUnavailable(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for AbyssError {
    fn from(err: anyhow::Error) -> Self {
        AbyssError::Other(err.to_string())
    }
}

impl From<toml::de::Error> for AbyssError {
    fn from(err: toml::de::Error) -> Self {
        AbyssError::ConfigError(err.to_string())
    }
}

/// Result type for the abyss crate
pub type Result<T> = std::result::Result<T, AbyssError>;
