//! Bounded worker pool for part uploads
//!
//! ```text
//!   producer ──► job queue (rendezvous) ──► worker 1..W ──► result queue ──► aggregator
//!                                               │
//!                                      supervisor joins all workers,
//!                                      then drops the last result sender
//! ```
//!
//! Every job is received by exactly one worker. A failing part never stops a
//! worker; it reports the failure and pulls the next job. The result queue
//! closes only after every worker task has exited.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use pdrive_core::{CompletedPart, PartJob, PartResult, UploadSession};

use crate::api::MultipartApi;
use crate::error::{UploadError, UploadResult};
use crate::progress::{track_stream, ProgressSink, ProgressTracker};
use crate::source::SourceFile;

/// Result of one part upload as produced by a worker
pub type PartOutcome = PartResult<UploadError>;

/// Fixed-size pool of part upload workers
pub struct WorkerPool<A: MultipartApi> {
    api: Arc<A>,
    workers: usize,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl<A: MultipartApi> WorkerPool<A> {
    pub fn new(
        api: Arc<A>,
        workers: usize,
        progress: Arc<dyn ProgressSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            workers: workers.max(1),
            progress,
            cancel,
        }
    }

    /// Start the workers and feed them `jobs`.
    ///
    /// Returns the result stream; it ends once all workers have exited.
    pub fn spawn(
        self,
        session: Arc<UploadSession>,
        source: Arc<SourceFile>,
        jobs: Vec<PartJob>,
    ) -> mpsc::Receiver<PartOutcome> {
        let (job_tx, job_rx) = flume::bounded::<PartJob>(0);
        let (result_tx, result_rx) = mpsc::channel(jobs.len().max(1));

        debug!(
            "Starting {} upload workers for {} parts",
            self.workers,
            jobs.len()
        );

        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            let worker = Worker {
                id,
                api: Arc::clone(&self.api),
                session: Arc::clone(&session),
                source: Arc::clone(&source),
                progress: Arc::clone(&self.progress),
                jobs: job_rx.clone(),
                results: result_tx.clone(),
                cancel: self.cancel.clone(),
            };
            workers.spawn(worker.run());
        }
        drop(job_rx);

        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            for job in jobs {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("Upload cancelled, no further parts submitted");
                        break;
                    }
                    sent = job_tx.send_async(job) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
            // Dropping the sender closes the job queue
        });

        tokio::spawn(async move {
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    error!("Upload worker terminated abnormally: {}", e);
                }
            }
            drop(result_tx);
        });

        result_rx
    }
}

struct Worker<A: MultipartApi> {
    id: usize,
    api: Arc<A>,
    session: Arc<UploadSession>,
    source: Arc<SourceFile>,
    progress: Arc<dyn ProgressSink>,
    jobs: flume::Receiver<PartJob>,
    results: mpsc::Sender<PartOutcome>,
    cancel: CancellationToken,
}

impl<A: MultipartApi> Worker<A> {
    async fn run(self) {
        loop {
            let job = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                job = self.jobs.recv_async() => match job {
                    Ok(job) => job,
                    Err(_) => break,
                },
            };

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => PartResult::Failure {
                    part_number: job.part_number,
                    cause: UploadError::Cancelled,
                },
                outcome = self.upload(job) => outcome,
            };

            if self.results.send(outcome).await.is_err() {
                debug!("Worker {}: result stream closed, exiting", self.id);
                break;
            }
        }
        debug!("Worker {} finished", self.id);
    }

    async fn upload(&self, job: PartJob) -> PartOutcome {
        let tracker = self
            .progress
            .track(&format!("Part {}", job.part_number), job.length);

        match self.try_upload(&job, &tracker).await {
            Ok(part) => {
                tracker.finish();
                debug!(
                    "Worker {}: part {} uploaded ({} bytes, etag {})",
                    self.id, job.part_number, job.length, part.etag
                );
                PartResult::Success(part)
            }
            Err(cause) => {
                tracker.abandon();
                warn!("Worker {}: part {} failed: {}", self.id, job.part_number, cause);
                PartResult::Failure {
                    part_number: job.part_number,
                    cause,
                }
            }
        }
    }

    async fn try_upload(
        &self,
        job: &PartJob,
        tracker: &Arc<dyn ProgressTracker>,
    ) -> UploadResult<CompletedPart> {
        let body = track_stream(self.source.read_range(job).await?, Arc::clone(tracker));
        let part = self.api.upload_part(&self.session, job, body).await?;

        if part.part_number != job.part_number {
            return Err(UploadError::Protocol(format!(
                "server acknowledged part {} for part {}",
                part.part_number, job.part_number
            )));
        }
        Ok(part)
    }
}
