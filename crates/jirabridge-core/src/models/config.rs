//! Application configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    pub jira: JiraConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitConfig,
}

/// Connection settings for the Jira instance.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct JiraConfig {
    pub base_url: String,
    /// Account name for basic auth. Leave empty to send the token as a bearer
    /// token (personal access tokens on Jira Server / Data Center).
    #[serde(default)]
    pub username: String,
    pub api_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

/// Bounds applied to every list operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LimitConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.jira.validate()?;
        self.server.validate()?;
        self.limits.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            jira: JiraConfig::default(),
            server: ServerConfig::default(),
            limits: LimitConfig::default(),
        }
    }
}

impl JiraConfig {
    const MAX_TIMEOUT_SECS: u64 = 300;

    /// Validate Jira connection settings
    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(Error::Validation("Jira base URL cannot be empty".to_string()));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Validation(format!(
                "Jira base URL '{}' must start with http:// or https://",
                base_url
            )));
        }

        if self.api_token.trim().is_empty() {
            return Err(Error::Validation(
                "Jira API token cannot be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 || self.timeout_secs > Self::MAX_TIMEOUT_SECS {
            return Err(Error::Validation(format!(
                "Jira timeout must be between 1 and {} seconds",
                Self::MAX_TIMEOUT_SECS
            )));
        }

        Ok(())
    }

    /// Base URL of the REST API v2, without a trailing slash
    pub fn api_base(&self) -> String {
        format!("{}/rest/api/2", self.base_url.trim().trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn uses_basic_auth(&self) -> bool {
        !self.username.trim().is_empty()
    }
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Validation("Server host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(Error::Validation("Server port cannot be 0".to_string()));
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
            log_level: "info".to_string(),
        }
    }
}

impl LimitConfig {
    /// Validate limit bounds
    pub fn validate(&self) -> Result<()> {
        if self.max_limit == 0 {
            return Err(Error::Validation(
                "Max limit must be greater than 0".to_string(),
            ));
        }

        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(Error::Validation(format!(
                "Default limit must be between 1 and {}",
                self.max_limit
            )));
        }

        Ok(())
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}
