//! Multipart upload types shared by the client and the planner

use serde::{Deserialize, Serialize};

/// Server-assigned context for one multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSession {
    /// Object key the finished upload will be stored under
    #[serde(rename = "Key")]
    pub key: String,
    /// Upload ID correlating all parts of the session
    #[serde(rename = "UploadId")]
    pub upload_id: String,
}

/// A contiguous byte range of the source file uploaded as one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartJob {
    /// 1-based part number
    pub part_number: u32,
    /// Offset of the first byte of the part
    pub offset: u64,
    /// Length of the part in bytes
    pub length: u64,
}

impl PartJob {
    /// Offset one past the last byte of the part
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Part metadata echoed back to the service when finishing a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletedPart {
    #[serde(rename = "partNumber")]
    pub part_number: u32,
    #[serde(rename = "etag")]
    pub etag: String,
}

/// Outcome of uploading a single part
#[derive(Debug)]
pub enum PartResult<E> {
    Success(CompletedPart),
    Failure { part_number: u32, cause: E },
}

impl<E> PartResult<E> {
    pub fn part_number(&self) -> u32 {
        match self {
            PartResult::Success(part) => part.part_number,
            PartResult::Failure { part_number, .. } => *part_number,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PartResult::Success(_))
    }
}
