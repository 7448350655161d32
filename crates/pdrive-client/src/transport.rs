//! HTTP transport for the pdrive API
//!
//! Wraps a pooled `reqwest` client with:
//! - Bearer authentication on every request
//! - Endpoint construction relative to the configured base URL
//! - Status and body mapping into [`UploadError`]
//!
//! Requests are sent exactly once. There is no retry at this layer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client, ClientBuilder, Response, StatusCode};
use tracing::{debug, info};
use url::Url;

use pdrive_core::{CompletedPart, PartJob, UploadConfig, UploadSession};

use crate::api::MultipartApi;
use crate::error::{UploadError, UploadResult};
use crate::progress::{track_stream, ProgressSink};
use crate::source::{ByteStream, SourceFile};

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Overall request timeout; `None` lets large parts take as long as needed
    pub timeout: Option<Duration>,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
        }
    }
}

/// Client for the pdrive upload API
pub struct ApiClient {
    client: Client,
    base: Url,
    token: String,
    config: TransportConfig,
}

impl ApiClient {
    /// Create a client for the API described by `upload`
    pub fn new(upload: &UploadConfig, config: TransportConfig) -> UploadResult<Self> {
        if upload.api_url.cannot_be_a_base() {
            return Err(UploadError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                upload.api_url
            )));
        }

        let mut builder = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| UploadError::Transport(format!("Unable to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: upload.api_url.clone(),
            token: upload.token.clone(),
            config,
        })
    }

    /// Base URL of the API
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `{base}/{segments...}`.
    ///
    /// Each segment is percent-encoded; a `/` inside a segment starts a new
    /// path segment. Leading and trailing slashes are dropped, empty inner
    /// segments are kept.
    pub fn endpoint(&self, segments: &[&str]) -> UploadResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                UploadError::InvalidUrl(format!("{} cannot be used as a base URL", self.base))
            })?;
            path.pop_if_empty();
            for segment in segments {
                let segment = segment.trim_matches('/');
                if !segment.is_empty() {
                    path.extend(segment.split('/'));
                }
            }
        }
        Ok(url)
    }

    /// Public URL of an uploaded object
    pub fn resource_url(&self, key: &str) -> UploadResult<String> {
        Ok(self.endpoint(&[key])?.to_string())
    }

    /// Upload `source` with a single request and return its URL
    pub async fn upload_single(
        &self,
        source: &SourceFile,
        progress: &dyn ProgressSink,
    ) -> UploadResult<String> {
        let url = self.endpoint(&["upload", source.name()])?;
        let tracker = progress.track(source.name(), source.size());
        let body = track_stream(source.read_all().await?, tracker.clone());

        debug!("POST {} ({} bytes)", url, source.size());

        let result = async {
            let response = self
                .client
                .post(url)
                .bearer_auth(&self.token)
                .header(CONTENT_LENGTH, source.size())
                .body(Body::wrap_stream(body))
                .send()
                .await
                .map_err(|e| {
                    UploadError::Transport(format!("Unable to send request to server: {}", e))
                })?;

            let status = response.status();
            let text = read_text(response).await?;

            if status != StatusCode::OK {
                return Err(UploadError::from_single_status(status.as_u16(), text));
            }
            // Body holds the object key
            let key = text.trim();
            if key.is_empty() {
                return Err(UploadError::Protocol(
                    "upload response did not contain an object key".into(),
                ));
            }
            self.resource_url(key)
        }
        .await;

        match &result {
            Ok(url) => {
                tracker.finish();
                info!("Uploaded {} to {}", source.name(), url);
            }
            Err(_) => tracker.abandon(),
        }
        result
    }
}

/// Parse a successful JSON response, mapping failures onto the error taxonomy
async fn parse_json<T: serde::de::DeserializeOwned>(
    response: Response,
    what: &str,
) -> UploadResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = read_text(response).await?;
        return Err(UploadError::remote(status.as_u16(), body));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| UploadError::Transport(format!("Unable to read {} response: {}", what, e)))?;

    serde_json::from_slice(&body).map_err(|e| {
        UploadError::Protocol(format!(
            "Failed to parse {} response ({}): {}",
            what,
            e,
            String::from_utf8_lossy(&body)
        ))
    })
}

async fn read_text(response: Response) -> UploadResult<String> {
    response
        .text()
        .await
        .map_err(|e| UploadError::Transport(format!("Unable to read response body: {}", e)))
}

#[async_trait]
impl MultipartApi for ApiClient {
    async fn init_session(&self, file_name: &str) -> UploadResult<UploadSession> {
        let url = self.endpoint(&["upload-part", "init", file_name])?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| UploadError::Transport(format!("Error while executing request: {}", e)))?;

        let session: UploadSession = parse_json(response, "init").await?;
        info!(
            "Opened multipart session {} for key {}",
            session.upload_id, session.key
        );
        Ok(session)
    }

    async fn upload_part(
        &self,
        session: &UploadSession,
        job: &PartJob,
        body: ByteStream,
    ) -> UploadResult<CompletedPart> {
        let mut url = self.endpoint(&["upload-part", "put", &session.key, &session.upload_id])?;
        url.query_pairs_mut()
            .append_pair("partNumber", &job.part_number.to_string());

        debug!("PUT {} ({} bytes)", url, job.length);

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .header(CONTENT_LENGTH, job.length)
            .body(Body::wrap_stream(body))
            .send()
            .await
            .map_err(|e| UploadError::Transport(format!("Failed to execute request: {}", e)))?;

        parse_json(response, "upload part").await
    }

    async fn finish_session(
        &self,
        session: &UploadSession,
        parts: &[CompletedPart],
    ) -> UploadResult<String> {
        let url = self.endpoint(&["upload-part", "finish", &session.key, &session.upload_id])?;
        let payload = serde_json::to_vec(parts)
            .map_err(|e| UploadError::Protocol(format!("Failed to encode JSON: {}", e)))?;

        debug!("POST {} ({} parts)", url, parts.len());

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                UploadError::Transport(format!("Failed to execute finishing request: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = read_text(response)
                .await
                .unwrap_or_else(|e| format!("Failed to read body: {}", e));
            return Err(UploadError::remote(status.as_u16(), body));
        }

        self.resource_url(&session.key)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let config = UploadConfig::parse(base, "token").unwrap();
        ApiClient::new(&config, TransportConfig::default()).unwrap()
    }

    #[test]
    fn test_transport_config_default() {
        let config = TransportConfig::default();
        assert!(config.timeout.is_none());
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_endpoint_building() {
        let api = client("http://localhost:8080");
        assert_eq!(
            api.endpoint(&["upload-part", "init", "movie.mkv"])
                .unwrap()
                .as_str(),
            "http://localhost:8080/upload-part/init/movie.mkv"
        );

        let api = client("http://localhost:8080/api/");
        assert_eq!(
            api.endpoint(&["upload", "a.txt"]).unwrap().as_str(),
            "http://localhost:8080/api/upload/a.txt"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = client("https://drive.example.com/v1");
        assert_eq!(
            api.endpoint(&["upload", "my file #1.txt"]).unwrap().as_str(),
            "https://drive.example.com/v1/upload/my%20file%20%231.txt"
        );
    }

    #[test]
    fn test_resource_url_with_nested_key() {
        let api = client("https://drive.example.com");
        assert_eq!(
            api.resource_url("abc123/movie.mkv").unwrap(),
            "https://drive.example.com/abc123/movie.mkv"
        );
    }

    #[test]
    fn test_endpoint_keeps_inner_empty_segments() {
        let api = client("https://drive.example.com");
        assert_eq!(
            api.resource_url("a//b").unwrap(),
            "https://drive.example.com/a//b"
        );
        assert_eq!(
            api.resource_url("/abc/movie.mkv/").unwrap(),
            "https://drive.example.com/abc/movie.mkv"
        );
        assert_eq!(
            api.endpoint(&["upload-part", "put", "a//b", "u1"])
                .unwrap()
                .as_str(),
            "https://drive.example.com/upload-part/put/a//b/u1"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = UploadConfig::parse("mailto:someone@example.com", "t").unwrap();
        assert!(matches!(
            ApiClient::new(&config, TransportConfig::default()),
            Err(UploadError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let api = client("http://localhost:8080");
        let debug = format!("{:?}", api);
        assert!(!debug.contains("token"));
    }
}
