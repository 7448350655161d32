//! Upload configuration

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Immutable settings for one upload run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Base URL of the remote API
    pub api_url: Url,

    /// Bearer token sent with every request
    pub token: String,

    /// Number of concurrent part uploads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum part size in bytes
    #[serde(default = "default_part_size")]
    pub part_size: u64,

    /// Files larger than this are uploaded in parts
    #[serde(default = "default_part_size")]
    pub multipart_threshold: u64,

    /// Cancel outstanding part uploads once one part fails
    #[serde(default)]
    pub cancel_on_failure: bool,
}

fn default_workers() -> usize {
    crate::DEFAULT_WORKERS
}

fn default_part_size() -> u64 {
    crate::DEFAULT_PART_SIZE
}

impl UploadConfig {
    pub fn new(api_url: Url, token: impl Into<String>) -> Self {
        Self {
            api_url,
            token: token.into(),
            workers: default_workers(),
            part_size: default_part_size(),
            multipart_threshold: default_part_size(),
            cancel_on_failure: false,
        }
    }

    /// Parse the base URL and build a config with defaults
    pub fn parse(api_url: &str, token: impl Into<String>) -> Result<Self> {
        let url = Url::parse(api_url)?;
        Ok(Self::new(url, token))
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the part size; the multipart threshold follows it
    pub fn with_part_size(mut self, part_size: u64) -> Self {
        self.part_size = part_size;
        self.multipart_threshold = part_size;
        self
    }

    pub fn with_multipart_threshold(mut self, threshold: u64) -> Self {
        self.multipart_threshold = threshold;
        self
    }

    pub fn with_cancel_on_failure(mut self, cancel: bool) -> Self {
        self.cancel_on_failure = cancel;
        self
    }

    /// Whether a file of `size` bytes goes through the multipart path
    pub fn use_multipart(&self, size: u64) -> bool {
        size > self.multipart_threshold
    }

    pub fn validate(&self) -> Result<()> {
        match self.api_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::InvalidConfig(format!(
                    "API URL must use http or https, got '{}'",
                    other
                )))
            }
        }
        if self.api_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "API URL cannot be used as a base: {}",
                self.api_url
            )));
        }
        if self.token.trim().is_empty() {
            return Err(Error::InvalidConfig("token must not be empty".into()));
        }
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be at least 1".into()));
        }
        if self.part_size == 0 {
            return Err(Error::InvalidConfig(
                "part size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> UploadConfig {
        UploadConfig::parse("http://localhost:8080/api", "secret").unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.workers, 2);
        assert_eq!(config.part_size, 50 * 1024 * 1024);
        assert_eq!(config.multipart_threshold, config.part_size);
        assert!(!config.cancel_on_failure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_routing_threshold() {
        let config = config().with_part_size(100);
        assert!(!config.use_multipart(0));
        assert!(!config.use_multipart(100));
        assert!(config.use_multipart(101));

        let config = config.with_multipart_threshold(10);
        assert!(config.use_multipart(11));
        assert_eq!(config.part_size, 100);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(config().with_workers(0).validate().is_err());
        assert!(config().with_part_size(0).validate().is_err());

        let mut no_token = config();
        no_token.token = "  ".into();
        assert!(no_token.validate().is_err());

        let ftp = UploadConfig::parse("ftp://example.com", "t").unwrap();
        assert!(matches!(ftp.validate(), Err(Error::InvalidConfig(_))));

        let mailto = UploadConfig::parse("mailto:someone@example.com", "t").unwrap();
        assert!(mailto.validate().is_err());
    }

    #[test]
    fn test_parse_invalid_url() {
        assert!(matches!(
            UploadConfig::parse("::nope", "t"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: UploadConfig =
            serde_json::from_str(r#"{"api_url":"https://drive.example.com","token":"t"}"#)
                .unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.part_size, 50 * 1024 * 1024);
    }
}
