use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::error::AbyssError;
use crate::workspace::storage::default_dir;

const CONFIG_FILE: &str = "config.toml";

/// Runtime settings.
///
/// Built from defaults, then `~/.abyss/config.toml` when it exists, then
/// whatever the command line (or its `ABYSS_*` environment fallbacks) sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub workspace: WorkspaceConfig,
    pub sync: SyncConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built client bundle served for every non-API path.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4567,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub debounce_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            poll_interval_ms: 5000,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Unset means outbound calls may take as long as the target does.
    pub timeout_secs: Option<u64>,
}

impl ProxyConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Defaults overlaid with `~/.abyss/config.toml`, if present.
    pub fn load() -> Result<Self> {
        let path = default_dir().join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AbyssError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Address to listen on. Only loopback addresses are accepted.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let host = if self.server.host == "localhost" {
            "127.0.0.1"
        } else {
            self.server.host.as_str()
        };
        let ip: IpAddr = host.parse().map_err(|_| {
            AbyssError::ConfigError(format!("Invalid host: {}", self.server.host))
        })?;
        if !ip.is_loopback() {
            return Err(AbyssError::ConfigError(format!(
                "Refusing to listen on non-loopback address {}",
                ip
            )));
        }
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if self.sync.poll_interval_ms == 0 {
            return Err(AbyssError::ConfigError(
                "sync.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
