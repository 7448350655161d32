//! Configuration management for pdrive CLI
//!
//! Config file location: `<user config dir>/pdrive/config.toml`, created with
//! defaults on first use.
//!
//! Example config:
//! ```toml
//! token = "my-secret-token"
//! api_url = "https://drive.example.com"
//! concurrent_requests = 2
//! part_size = 52428800
//! cancel_on_failure = false
//! timeout = 0
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pdrive_client::TransportConfig;
use pdrive_core::UploadConfig;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bearer token
    pub token: Option<String>,

    /// Base URL of the pdrive API
    pub api_url: Option<String>,

    /// Number of parts uploaded at the same time
    #[serde(default = "default_concurrent")]
    pub concurrent_requests: usize,

    /// Multipart part size (bytes)
    #[serde(default = "default_part_size")]
    pub part_size: u64,

    /// Multipart upload threshold (bytes), defaults to the part size
    pub multipart_threshold: Option<u64>,

    /// Stop outstanding parts once one fails
    #[serde(default)]
    pub cancel_on_failure: bool,

    /// Request timeout in seconds, 0 for none
    #[serde(default)]
    pub timeout: u64,
}

fn default_concurrent() -> usize {
    pdrive_core::DEFAULT_WORKERS
}

fn default_part_size() -> u64 {
    pdrive_core::DEFAULT_PART_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            api_url: None,
            concurrent_requests: default_concurrent(),
            part_size: default_part_size(),
            multipart_threshold: None,
            cancel_on_failure: false,
            timeout: 0,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "pdrive")
            .context("Could not determine user config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from file and environment, creating the file if missing
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load configuration from file only
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            tracing::info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Override values from environment variables
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = var("PDRIVE_TOKEN") {
            self.token = Some(token);
        }
        if let Some(api_url) = var("PDRIVE_API_URL") {
            self.api_url = Some(api_url);
        }
        if let Some(concurrent) = var("PDRIVE_CONCURRENT_REQUESTS") {
            self.concurrent_requests = concurrent
                .parse()
                .with_context(|| format!("Invalid PDRIVE_CONCURRENT_REQUESTS: {}", concurrent))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config folder: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Build the settings for an upload run
    pub fn to_upload_config(&self) -> Result<UploadConfig> {
        let api_url = self.api_url.as_deref().context(
            "API URL not configured. Set PDRIVE_API_URL or use 'pdrive configure set api_url <url>'",
        )?;
        let token = self.token.as_deref().context(
            "Token not configured. Set PDRIVE_TOKEN or use 'pdrive configure set token <token>'",
        )?;

        let mut config = UploadConfig::parse(api_url, token)
            .with_context(|| format!("Failed to parse URL from config: {}", api_url))?
            .with_workers(self.concurrent_requests)
            .with_part_size(self.part_size)
            .with_cancel_on_failure(self.cancel_on_failure);

        if let Some(threshold) = self.multipart_threshold {
            config = config.with_multipart_threshold(threshold);
        }

        Ok(config)
    }

    /// HTTP transport settings
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
            ..TransportConfig::default()
        }
    }

    /// Get a config value by key name
    pub fn get_value(&self, key: &str) -> Option<String> {
        match key {
            "token" => self.token.as_ref().map(|_| "***".to_string()), // Hide secret
            "api_url" => self.api_url.clone(),
            "concurrent_requests" => Some(self.concurrent_requests.to_string()),
            "part_size" => Some(self.part_size.to_string()),
            "multipart_threshold" => self.multipart_threshold.map(|t| t.to_string()),
            "cancel_on_failure" => Some(self.cancel_on_failure.to_string()),
            "timeout" => Some(self.timeout.to_string()),
            _ => None,
        }
    }

    /// Set a config value by key name
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "token" => self.token = Some(value.to_string()),
            "api_url" => self.api_url = Some(value.to_string()),
            "concurrent_requests" => self.concurrent_requests = value.parse()?,
            "part_size" => self.part_size = value.parse()?,
            "multipart_threshold" => self.multipart_threshold = Some(value.parse()?),
            "cancel_on_failure" => self.cancel_on_failure = value.parse()?,
            "timeout" => self.timeout = value.parse()?,
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get all config keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "token",
            "api_url",
            "concurrent_requests",
            "part_size",
            "multipart_threshold",
            "cancel_on_failure",
            "timeout",
        ]
    }
}
