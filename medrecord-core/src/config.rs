//! Portal configuration — TOML file with optional overrides.
//!
//! Every key is optional; a missing file yields the defaults. Paths may start
//! with `~/` to refer to the home directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::http::parse_base_url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Portal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    /// Origin of the analysis service, e.g. `https://portal.example.org`.
    pub base_url: String,
    /// Where downloaded reports are saved. Defaults to the platform download dir.
    pub download_dir: Option<PathBuf>,
    /// Per-request timeout. Unset keeps the HTTP client's default.
    pub request_timeout_secs: Option<u64>,
    /// Log file for the terminal portal.
    pub log_file: Option<PathBuf>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            download_dir: None,
            request_timeout_secs: None,
            log_file: None,
        }
    }
}

impl PortalConfig {
    /// Default config file location: `<config_dir>/medrecord/portal.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medrecord")
            .join("portal.toml")
    }

    /// Load from `path`, returning defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Load a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("parse portal TOML: {e}"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_base_url(&self.base_url).map(|_| ())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Resolved download directory.
    pub fn download_dir(&self) -> PathBuf {
        match &self.download_dir {
            Some(dir) => expand_home(dir),
            None => dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Resolved log file for the terminal portal.
    pub fn log_file(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => expand_home(path),
            None => dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("medrecord")
                .join("portal.log"),
        }
    }
}

/// Replace a leading `~` with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
