//! Runtime configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then the
//! environment. Command-line flags are applied last by the binary.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{DeskError, DeskResult};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "ticketdesk.toml";

/// Default web server URL.
pub const DEFAULT_WEB_URL: &str = "http://127.0.0.1:3030";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub redis_url: String,
    pub host: String,
    pub port: u16,
    /// Outbound frames buffered per WebSocket session before frames are dropped.
    pub channel_capacity: usize,
    pub session_ttl_secs: u64,
    pub login_limit: LoginLimit,
    /// Where CLI commands send change notifications.
    pub web_url: String,
}

/// Login attempts allowed per student id within a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginLimit {
    pub max_attempts: u32,
    pub window_secs: u64,
}

impl Default for LoginLimit {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 60,
        }
    }
}

impl LoginLimit {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3030,
            channel_capacity: 100,
            session_ttl_secs: 86_400,
            login_limit: LoginLimit::default(),
            web_url: DEFAULT_WEB_URL.to_string(),
        }
    }
}

impl DeskConfig {
    /// Load defaults, the config file and the environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> DeskResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> DeskResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DeskError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&text)
            .map_err(|e| DeskError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Override fields from environment variables read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> DeskResult<()> {
        if let Some(url) = lookup("REDIS_URL") {
            self.redis_url = url;
        }
        if let Some(host) = lookup("TICKETDESK_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("TICKETDESK_PORT") {
            self.port = port
                .parse()
                .map_err(|_| DeskError::Config(format!("TICKETDESK_PORT is not a port: {}", port)))?;
        }
        if let Some(url) = lookup("TICKETDESK_WEB_URL") {
            self.web_url = url;
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
