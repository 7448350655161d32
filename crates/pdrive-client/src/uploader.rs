//! File upload entry point

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use pdrive_core::{part_count, UploadConfig};

use crate::error::UploadResult;
use crate::multipart::MultipartUpload;
use crate::progress::{NoProgress, ProgressSink};
use crate::source::SourceFile;
use crate::transport::{ApiClient, TransportConfig};

/// How a file was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMethod {
    Single,
    Multipart { parts: usize },
}

/// Result of a completed upload
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub url: String,
    pub bytes: u64,
    pub method: UploadMethod,
}

/// Uploads files, choosing the single or multipart path by size
pub struct Uploader {
    client: Arc<ApiClient>,
    config: UploadConfig,
    progress: Arc<dyn ProgressSink>,
}

impl Uploader {
    pub fn new(config: UploadConfig) -> UploadResult<Self> {
        Self::with_transport(config, TransportConfig::default())
    }

    pub fn with_transport(config: UploadConfig, transport: TransportConfig) -> UploadResult<Self> {
        config.validate()?;
        let client = ApiClient::new(&config, transport)?;
        Ok(Self {
            client: Arc::new(client),
            config,
            progress: Arc::new(NoProgress),
        })
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Number of parts a file of `size` bytes is split into, zero for a single upload
    pub fn planned_parts(&self, size: u64) -> usize {
        if self.config.use_multipart(size) {
            part_count(size, self.config.part_size) as usize
        } else {
            0
        }
    }

    /// Upload the file at `path` and return where it can be found
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> UploadResult<UploadReport> {
        let source = SourceFile::open(path.as_ref()).await?;
        let bytes = source.size();

        if self.config.use_multipart(bytes) {
            info!(
                "Uploading {} ({} bytes) in parts with {} workers",
                source.name(),
                bytes,
                self.config.workers
            );
            let mut upload = MultipartUpload::new(Arc::clone(&self.client), &self.config)
                .with_progress(Arc::clone(&self.progress));
            let url = upload.run(source).await?;
            Ok(UploadReport {
                url,
                bytes,
                method: UploadMethod::Multipart {
                    parts: upload.part_count(),
                },
            })
        } else {
            info!("Uploading {} ({} bytes)", source.name(), bytes);
            let url = self
                .client
                .upload_single(&source, self.progress.as_ref())
                .await?;
            Ok(UploadReport {
                url,
                bytes,
                method: UploadMethod::Single,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UploadError;

    #[test]
    fn test_rejects_invalid_config() {
        let config = UploadConfig::parse("http://localhost:1", "").unwrap();
        assert!(matches!(
            Uploader::new(config),
            Err(UploadError::Core(pdrive_core::Error::InvalidConfig(_)))
        ));

        let config = UploadConfig::parse("ftp://localhost", "token").unwrap();
        assert!(Uploader::new(config).is_err());
    }

    #[test]
    fn test_planned_parts() {
        let config = UploadConfig::parse("http://localhost:1", "token")
            .unwrap()
            .with_part_size(50);
        let uploader = Uploader::new(config).unwrap();

        assert_eq!(uploader.planned_parts(0), 0);
        assert_eq!(uploader.planned_parts(50), 0);
        assert_eq!(uploader.planned_parts(51), 2);
        assert_eq!(uploader.planned_parts(120), 3);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let config = UploadConfig::parse("http://localhost:1", "token").unwrap();
        let uploader = Uploader::new(config).unwrap();
        let err = uploader
            .upload_file("/definitely/not/here.bin")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Io(_)));
    }
}
