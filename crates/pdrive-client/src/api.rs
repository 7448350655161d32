//! Remote multipart protocol

use async_trait::async_trait;

use pdrive_core::{CompletedPart, PartJob, UploadSession};

use crate::error::UploadResult;
use crate::source::ByteStream;

/// The three-phase multipart protocol of the remote service.
///
/// Every call is a single attempt; implementations never retry.
#[async_trait]
pub trait MultipartApi: Send + Sync + 'static {
    /// Open a new session for `file_name`
    async fn init_session(&self, file_name: &str) -> UploadResult<UploadSession>;

    /// Upload the byte range of `job` streamed from `body`
    async fn upload_part(
        &self,
        session: &UploadSession,
        job: &PartJob,
        body: ByteStream,
    ) -> UploadResult<CompletedPart>;

    /// Complete the session and return the resource URL
    async fn finish_session(
        &self,
        session: &UploadSession,
        parts: &[CompletedPart],
    ) -> UploadResult<String>;
}
