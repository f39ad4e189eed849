//
//  circleci-cli
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! This module handles loading, saving, and accessing the CLI's settings from
//! a TOML file stored in a platform-specific directory.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/circleci/config.toml`
//! - **macOS**: `~/Library/Application Support/circleci/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\circleci\config\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! host = "https://circleci.com"
//! rest_endpoint = "api/v2"
//! app_url = "https://app.circleci.com"
//! token = "0123456789abcdef"
//! timeout_secs = 30
//! ```
//!
//! ## Overrides
//!
//! The `--host` and `--token` global flags (or `CIRCLECI_CLI_HOST` and
//! `CIRCLECI_CLI_TOKEN`) take precedence over the file; see
//! [`Config::with_overrides`].
//!
//! ## Submodules
//!
//! - [`file`]: Low-level configuration file I/O operations
//! - [`hosts`]: Well-known hosts and host normalization

mod file;
mod hosts;

pub use file::*;
pub use hosts::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &["host", "rest_endpoint", "app_url", "token", "timeout_secs"];

/// Persistent CLI configuration.
///
/// All fields use serde defaults so a partial or missing file still yields a
/// usable configuration.
///
/// # Example
///
/// ```rust
/// use circleci_cli::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.host, "https://circleci.com");
/// assert_eq!(config.rest_endpoint, "api/v2");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// CircleCI host the REST API is served from.
    #[serde(default = "default_host")]
    pub host: String,

    /// Versioned REST API prefix appended to the host.
    #[serde(default = "default_rest_endpoint")]
    pub rest_endpoint: String,

    /// Web application URL used when opening projects in a browser.
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// Personal API token sent as `Circle-Token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    CIRCLECI_HOST.to_string()
}

fn default_rest_endpoint() -> String {
    "api/v2".to_string()
}

fn default_app_url() -> String {
    CIRCLECI_APP_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            rest_endpoint: default_rest_endpoint(),
            app_url: default_app_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads the configuration from the default location.
    ///
    /// Returns the defaults when no configuration file exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !config_exists(path) {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = read_config_file(path)?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_config_file(path, &content)
    }

    /// Returns the path of the configuration file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Applies command-line overrides on top of the file values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use circleci_cli::config::Config;
    ///
    /// let config = Config::default().with_overrides(Some("https://ci.example.com/"), None);
    /// assert_eq!(config.host, "https://ci.example.com");
    /// assert_eq!(config.token, None);
    /// ```
    pub fn with_overrides(mut self, host: Option<&str>, token: Option<&str>) -> Self {
        if let Some(host) = host {
            self.host = normalize_host_url(host);
        }
        if let Some(token) = token {
            self.token = Some(token.to_string());
        }
        self
    }

    /// Gets a configuration value by key.
    ///
    /// The token is returned as stored; callers displaying it should mask it.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "host" => Some(self.host.clone()),
            "rest_endpoint" => Some(self.rest_endpoint.clone()),
            "app_url" => Some(self.app_url.clone()),
            "token" => self.token.clone(),
            "timeout_secs" => Some(self.timeout_secs.to_string()),
            _ => None,
        }
    }

    /// Sets a configuration value by key.
    ///
    /// Returns an error for unknown keys or values that do not parse.
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "host" => self.host = normalize_host_url(&value),
            "rest_endpoint" => self.rest_endpoint = value.trim_matches('/').to_string(),
            "app_url" => self.app_url = normalize_host_url(&value),
            "token" => self.token = Some(value),
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout '{}': expected seconds", value))?;
            }
            _ => anyhow::bail!(
                "Unknown config key '{}'. Valid keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}
