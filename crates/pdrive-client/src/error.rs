//! Upload error types

use thiserror::Error;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Broad classification of an [`UploadError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be sent or the response not received
    Transport,
    /// The response body did not have the expected structure
    Protocol,
    /// The service answered with a non-success status
    Remote,
    /// An upload invariant was violated
    LogicFatal,
    /// The upload was cancelled
    Cancelled,
    /// Local I/O, URL or configuration problem
    Local,
}

/// Upload-related errors
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized response from server, wrong token?")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected status code ({status}): {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Part {part_number} failed: {cause}")]
    Part {
        part_number: u32,
        cause: Box<UploadError>,
    },

    #[error("Upload invariant violated: {0}")]
    LogicFatal(String),

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Core(#[from] pdrive_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Error for a non-success status during the multipart protocol
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        UploadError::UnexpectedStatus {
            status,
            body: body.into(),
        }
    }

    /// Error for a non-success status of a single-request upload
    pub fn from_single_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            400 => UploadError::BadRequest(body.into()),
            401 => UploadError::Unauthorized,
            500 => UploadError::Server(body.into()),
            _ => UploadError::remote(status, body),
        }
    }

    /// Wrap a failure with the part it belongs to
    pub fn for_part(part_number: u32, cause: UploadError) -> Self {
        UploadError::Part {
            part_number,
            cause: Box::new(cause),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::Transport(_) => ErrorKind::Transport,
            UploadError::Protocol(_) => ErrorKind::Protocol,
            UploadError::BadRequest(_)
            | UploadError::Unauthorized
            | UploadError::Server(_)
            | UploadError::UnexpectedStatus { .. } => ErrorKind::Remote,
            UploadError::Part { cause, .. } => cause.kind(),
            UploadError::LogicFatal(_) => ErrorKind::LogicFatal,
            UploadError::Cancelled => ErrorKind::Cancelled,
            UploadError::InvalidUrl(_) | UploadError::Core(_) | UploadError::Io(_) => {
                ErrorKind::Local
            }
        }
    }

    /// HTTP status code for errors reported by the service
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::BadRequest(_) => Some(400),
            UploadError::Unauthorized => Some(401),
            UploadError::Server(_) => Some(500),
            UploadError::UnexpectedStatus { status, .. } => Some(*status),
            UploadError::Part { cause, .. } => cause.status(),
            _ => None,
        }
    }

    /// Part number for failures raised by a part upload
    pub fn part_number(&self) -> Option<u32> {
        match self {
            UploadError::Part { part_number, .. } => Some(*part_number),
            _ => None,
        }
    }
}
