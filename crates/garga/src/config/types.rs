use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ConfigError;

/// Client configuration for one tracker account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Base URL of the tracker, with trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Account username, used for the login POST.
    pub username: String,

    /// Account password, used for the login POST.
    pub password: String,

    /// HTTP timeout in seconds for every request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,

    /// Path of the local cache database. `None` disables caching.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://karagarga.net/".to_string()
}

fn default_timeout_secs() -> u32 {
    30
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::ValidationError(
                "username must not be empty".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(ConfigError::ValidationError(
                "password must not be empty".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        Ok(())
    }
}
