//! pdrive Client - File uploads to the pdrive HTTP service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Uploader                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │   size <= threshold                 size > threshold        │
//! │          │                                 │                │
//! │          ▼                                 ▼                │
//! │  ┌───────────────┐              ┌─────────────────────┐     │
//! │  │ Single upload │              │   MultipartUpload   │     │
//! │  │               │              │                     │     │
//! │  │ - One POST    │              │ - Plan parts        │     │
//! │  │ - Streamed    │              │ - Init session      │     │
//! │  └───────┬───────┘              │ - WorkerPool        │     │
//! │          │                      │ - ResultAggregator  │     │
//! │          │                      │ - Finish session    │     │
//! │          │                      └──────────┬──────────┘     │
//! │          └──────────────────┬──────────────┘                │
//! │                    ┌────────┴────────┐                      │
//! │                    │    ApiClient    │                      │
//! │                    │  (HTTP/Bearer)  │                      │
//! │                    └─────────────────┘                      │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Features
//!
//! - **Bounded Concurrency**: A fixed number of workers upload parts
//! - **Streaming Bodies**: Part bodies are read from disk as they are sent
//! - **Fail Fast**: The first failed part aborts the upload before finish
//! - **Progress Hooks**: Byte-level progress through [`ProgressSink`]

mod aggregator;
mod api;
mod error;
mod multipart;
mod pool;
mod progress;
mod source;
mod transport;
mod uploader;

pub use aggregator::ResultAggregator;
pub use api::MultipartApi;
pub use error::{ErrorKind, UploadError, UploadResult};
pub use multipart::{MultipartUpload, UploadPhase};
pub use pool::{PartOutcome, WorkerPool};
pub use progress::{track_stream, NoProgress, ProgressSink, ProgressTracker};
pub use source::{ByteStream, SourceFile};
pub use transport::{ApiClient, TransportConfig};
pub use uploader::{UploadMethod, UploadReport, Uploader};

// Re-export types from core
pub use pdrive_core::{CompletedPart, PartJob, PartResult, UploadConfig, UploadSession};
