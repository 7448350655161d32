//! Local source files and their byte-range views

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use pdrive_core::PartJob;

use crate::error::{UploadError, UploadResult};

/// Streamed request body
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

const READ_CHUNK: usize = 64 * 1024;

/// A regular file to be uploaded
///
/// The size is captured once when the file is opened; the file must not be
/// modified while the upload runs.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: Arc<PathBuf>,
    name: String,
    size: u64,
}

impl SourceFile {
    /// Stat `path` and capture its name and size
    pub async fn open(path: impl AsRef<Path>) -> UploadResult<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;

        if !metadata.is_file() {
            return Err(UploadError::Core(pdrive_core::Error::InvalidArgument(
                format!("not a regular file: {}", path.display()),
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                UploadError::Core(pdrive_core::Error::InvalidArgument(format!(
                    "path has no file name: {}",
                    path.display()
                )))
            })?;

        Ok(Self {
            path: Arc::new(path.to_path_buf()),
            name,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name sent to the service
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Stream the whole file
    pub async fn read_all(&self) -> UploadResult<ByteStream> {
        let file = File::open(self.path.as_ref()).await?;
        Ok(ReaderStream::with_capacity(file.take(self.size), READ_CHUNK).boxed())
    }

    /// Stream the byte range of `job` through an independent file handle
    pub async fn read_range(&self, job: &PartJob) -> UploadResult<ByteStream> {
        if job.end() > self.size {
            return Err(UploadError::LogicFatal(format!(
                "part {} ends at byte {} past the end of {} ({} bytes)",
                job.part_number,
                job.end(),
                self.name,
                self.size
            )));
        }

        let mut file = File::open(self.path.as_ref()).await?;
        file.seek(SeekFrom::Start(job.offset)).await?;
        Ok(ReaderStream::with_capacity(file.take(job.length), READ_CHUNK).boxed())
    }
}
