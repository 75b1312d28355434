//! Configuration storage operations

use crate::{models::Config, Result};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";

/// Environment variables that take precedence over the config file.
pub const ENV_BASE_URL: &str = "JIRA_BASE_URL";
pub const ENV_USERNAME: &str = "JIRA_USERNAME";
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "JIRA_TIMEOUT_SECS";

pub struct ConfigStorage {
    config_path: PathBuf,
    write_defaults: bool,
}

impl ConfigStorage {
    /// Storage rooted at a config directory. A missing file is created with
    /// defaults on first load.
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_path: config_dir.join(CONFIG_FILE),
            write_defaults: true,
        }
    }

    /// Storage for an explicit file chosen by the operator. Never written to
    /// implicitly.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            write_defaults: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return self.defaults();
        }

        let content = std::fs::read_to_string(&self.config_path)?;

        // Handle empty file case
        if content.trim().is_empty() {
            return self.defaults();
        }

        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        Ok(())
    }

    fn defaults(&self) -> Result<Config> {
        let config = Config::default();
        if self.write_defaults {
            self.save(&config)?;
        }
        Ok(config)
    }
}

/// Overlay Jira settings found through `lookup` onto `config`.
///
/// Empty values are ignored so an unset variable in a `.env` file does not
/// wipe out a value from the config file.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(base_url) = get(ENV_BASE_URL) {
        config.jira.base_url = base_url;
    }

    if let Some(username) = get(ENV_USERNAME) {
        config.jira.username = username;
    }

    if let Some(token) = get(ENV_API_TOKEN) {
        config.jira.api_token = token;
    }

    if let Some(timeout) = get(ENV_TIMEOUT_SECS) {
        config.jira.timeout_secs = timeout.trim().parse().map_err(|_| {
            crate::Error::Validation(format!("{} must be a number of seconds", ENV_TIMEOUT_SECS))
        })?;
    }

    Ok(())
}

/// Read `.env` (if any) into the process environment, then apply the Jira
/// overrides from it.
pub fn load_process_env(config: &mut Config) -> Result<()> {
    dotenv::dotenv().ok();
    apply_env_overrides(config, |key| std::env::var(key).ok())
}
