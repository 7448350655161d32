//! pdrive Core Library
//!
//! Core types, part planning and configuration for the pdrive upload client.

pub mod config;
pub mod error;
pub mod planner;
pub mod types;

pub use config::UploadConfig;
pub use error::{Error, Result};
pub use planner::{part_count, plan_parts};
pub use types::{CompletedPart, PartJob, PartResult, UploadSession};

/// pdrive version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default maximum part size (50 MiB)
pub const DEFAULT_PART_SIZE: u64 = 50 * 1024 * 1024;

/// Default number of concurrent part uploads
pub const DEFAULT_WORKERS: usize = 2;
