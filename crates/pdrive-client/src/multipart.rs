//! Multipart upload coordinator
//!
//! Drives one upload through init, parallel part uploads and finish:
//!
//! ```text
//! Init → Planning → SessionOpen → PartsInFlight → Aggregating → Finishing → Done
//!           │            │                             │             │
//!           └────────────┴──────────── Failed ◄────────┴─────────────┘
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pdrive_core::{plan_parts, UploadConfig};

use crate::aggregator::ResultAggregator;
use crate::api::MultipartApi;
use crate::error::{UploadError, UploadResult};
use crate::pool::WorkerPool;
use crate::progress::{NoProgress, ProgressSink};
use crate::source::SourceFile;

/// Lifecycle of a multipart upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Init,
    Planning,
    SessionOpen,
    PartsInFlight,
    Aggregating,
    Finishing,
    Done,
    Failed,
}

impl UploadPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadPhase::Done | UploadPhase::Failed)
    }
}

/// Uploads one file in parts through a [`MultipartApi`]
pub struct MultipartUpload<A: MultipartApi> {
    api: Arc<A>,
    workers: usize,
    part_size: u64,
    cancel_on_failure: bool,
    progress: Arc<dyn ProgressSink>,
    phase: UploadPhase,
    parts: usize,
}

impl<A: MultipartApi> MultipartUpload<A> {
    pub fn new(api: Arc<A>, config: &UploadConfig) -> Self {
        Self {
            api,
            workers: config.workers,
            part_size: config.part_size,
            cancel_on_failure: config.cancel_on_failure,
            progress: Arc::new(NoProgress),
            phase: UploadPhase::Init,
            parts: 0,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// Number of parts planned for the upload
    pub fn part_count(&self) -> usize {
        self.parts
    }

    /// Upload `source` and return the resource URL
    pub async fn run(&mut self, source: SourceFile) -> UploadResult<String> {
        let name = source.name().to_string();
        let result = self.drive(source).await;

        match &result {
            Ok(url) => {
                self.transition(UploadPhase::Done);
                info!("Multipart upload of {} complete: {}", name, url);
            }
            Err(e) => {
                self.transition(UploadPhase::Failed);
                error!("Multipart upload of {} failed: {}", name, e);
            }
        }
        result
    }

    async fn drive(&mut self, source: SourceFile) -> UploadResult<String> {
        self.transition(UploadPhase::Planning);
        let jobs = plan_parts(source.size(), self.part_size)?;
        if jobs.is_empty() {
            return Err(UploadError::Core(pdrive_core::Error::InvalidArgument(
                format!("{} is empty and cannot be uploaded in parts", source.name()),
            )));
        }
        self.parts = jobs.len();

        info!("Initializing upload of {} ({} parts)", source.name(), jobs.len());
        let session = Arc::new(self.api.init_session(source.name()).await?);
        self.transition(UploadPhase::SessionOpen);

        let cancel = CancellationToken::new();
        let pool = WorkerPool::new(
            Arc::clone(&self.api),
            self.workers,
            Arc::clone(&self.progress),
            cancel.clone(),
        );
        let mut results = pool.spawn(Arc::clone(&session), Arc::new(source), jobs.clone());
        self.transition(UploadPhase::PartsInFlight);

        self.transition(UploadPhase::Aggregating);
        let parts = match ResultAggregator::new(&jobs).drain(&mut results).await {
            Ok(parts) => parts,
            Err(e) => {
                if self.cancel_on_failure {
                    cancel.cancel();
                    debug!("Cancelled outstanding part uploads");
                } else {
                    warn!("Part uploads already in flight continue in the background");
                }
                return Err(e);
            }
        };

        self.transition(UploadPhase::Finishing);
        self.api.finish_session(&session, &parts).await
    }

    fn transition(&mut self, next: UploadPhase) {
        debug!("Multipart upload: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}
