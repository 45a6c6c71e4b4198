//! Configuration - endpoint and link base URLs
//!
//! Loaded from a YAML file (`~/.config/pncview/config.yml` by default, or
//! the path given with `--config`). Command line flags and environment
//! variables override individual keys afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Used when no task endpoint is configured
pub const DEFAULT_TASKS_BASE_URL: &str = "http://localhost:8080";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base of the task list endpoint; `{base}/rest/tasks` is fetched.
    /// An empty value produces a relative URL, which cannot be fetched
    /// from a terminal and ends up as a logged transport error.
    pub tasks_base_url: String,
    /// Base of the PNC web UI used for build detail links. Empty yields
    /// relative links.
    pub pnc_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks_base_url: DEFAULT_TASKS_BASE_URL.to_string(),
            pnc_base_url: String::new(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pncview")
            .join("config.yml")
    }

    /// Load from an explicit path, which must exist
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if given, else the default file if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let default_path = Self::default_path();
        if default_path.exists() {
            log::info!("Using config {}", default_path.display());
            return Self::from_file(&default_path);
        }

        Ok(Self::default())
    }

    /// Apply command line / environment overrides
    pub fn with_overrides(
        mut self,
        tasks_base_url: Option<String>,
        pnc_base_url: Option<String>,
    ) -> Self {
        if let Some(url) = tasks_base_url {
            self.tasks_base_url = url;
        }
        if let Some(url) = pnc_base_url {
            self.pnc_base_url = url;
        }
        self
    }

    /// Full URL of the task list
    pub fn tasks_url(&self) -> String {
        format!("{}/rest/tasks", self.tasks_base_url.trim_end_matches('/'))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
