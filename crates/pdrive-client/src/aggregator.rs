//! Collects part results from the worker pool

use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::mpsc;
use tracing::debug;

use pdrive_core::{CompletedPart, PartJob, PartResult};

use crate::error::{UploadError, UploadResult};
use crate::pool::PartOutcome;

/// Gathers successful parts and fails on the first reported failure
#[derive(Debug)]
pub struct ResultAggregator {
    expected: BTreeSet<u32>,
    completed: BTreeMap<u32, CompletedPart>,
}

impl ResultAggregator {
    pub fn new(planned: &[PartJob]) -> Self {
        Self {
            expected: planned.iter().map(|job| job.part_number).collect(),
            completed: BTreeMap::new(),
        }
    }

    /// Number of parts recorded so far
    pub fn completed(&self) -> usize {
        self.completed.len()
    }

    /// Record one outcome; a failure is returned wrapped with its part number
    pub fn record(&mut self, outcome: PartOutcome) -> UploadResult<()> {
        match outcome {
            PartResult::Failure { part_number, cause } => {
                Err(UploadError::for_part(part_number, cause))
            }
            PartResult::Success(part) => {
                if !self.expected.contains(&part.part_number) {
                    return Err(UploadError::LogicFatal(format!(
                        "received unplanned part {}",
                        part.part_number
                    )));
                }
                if self.completed.contains_key(&part.part_number) {
                    return Err(UploadError::LogicFatal(format!(
                        "part {} completed twice",
                        part.part_number
                    )));
                }
                debug!(
                    "Part {} complete ({}/{})",
                    part.part_number,
                    self.completed.len() + 1,
                    self.expected.len()
                );
                self.completed.insert(part.part_number, part);
                Ok(())
            }
        }
    }

    /// Check that every planned part completed and return them in part order
    pub fn finish(self) -> UploadResult<Vec<CompletedPart>> {
        let missing: Vec<String> = self
            .expected
            .iter()
            .filter(|n| !self.completed.contains_key(*n))
            .map(|n| n.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(UploadError::LogicFatal(format!(
                "result stream ended without parts {}",
                missing.join(", ")
            )));
        }

        Ok(self.completed.into_values().collect())
    }

    /// Consume `results` until the stream ends or a part fails
    pub async fn drain(
        mut self,
        results: &mut mpsc::Receiver<PartOutcome>,
    ) -> UploadResult<Vec<CompletedPart>> {
        while let Some(outcome) = results.recv().await {
            self.record(outcome)?;
        }
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdrive_core::plan_parts;

    fn success(n: u32) -> PartOutcome {
        PartResult::Success(CompletedPart {
            part_number: n,
            etag: format!("e{}", n),
        })
    }

    #[test]
    fn test_collects_in_part_order() {
        let jobs = plan_parts(30, 10).unwrap();
        let mut agg = ResultAggregator::new(&jobs);
        for n in [3, 1, 2] {
            agg.record(success(n)).unwrap();
        }
        assert_eq!(agg.completed(), 3);

        let parts = agg.finish().unwrap();
        let numbers: Vec<u32> = parts.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_failure_is_wrapped_with_part_number() {
        let jobs = plan_parts(30, 10).unwrap();
        let mut agg = ResultAggregator::new(&jobs);
        agg.record(success(1)).unwrap();

        let err = agg
            .record(PartResult::Failure {
                part_number: 2,
                cause: UploadError::remote(500, "oops"),
            })
            .unwrap_err();
        assert_eq!(err.part_number(), Some(2));
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_missing_part_is_fatal() {
        let jobs = plan_parts(30, 10).unwrap();
        let mut agg = ResultAggregator::new(&jobs);
        agg.record(success(1)).unwrap();
        agg.record(success(3)).unwrap();

        let err = agg.finish().unwrap_err();
        assert!(matches!(err, UploadError::LogicFatal(ref msg) if msg.contains('2')));
    }

    #[test]
    fn test_duplicate_and_unplanned_parts_are_fatal() {
        let jobs = plan_parts(20, 10).unwrap();
        let mut agg = ResultAggregator::new(&jobs);
        agg.record(success(1)).unwrap();
        assert!(matches!(
            agg.record(success(1)),
            Err(UploadError::LogicFatal(_))
        ));
        assert!(matches!(
            agg.record(success(9)),
            Err(UploadError::LogicFatal(_))
        ));
    }

    #[tokio::test]
    async fn test_drain_short_circuits() {
        let jobs = plan_parts(30, 10).unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(success(1)).await.unwrap();
        tx.send(PartResult::Failure {
            part_number: 2,
            cause: UploadError::Transport("reset".into()),
        })
        .await
        .unwrap();
        tx.send(success(3)).await.unwrap();
        drop(tx);

        let err = ResultAggregator::new(&jobs).drain(&mut rx).await.unwrap_err();
        assert_eq!(err.part_number(), Some(2));
        // The remaining result was left unread
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_drain_full_stream() {
        let jobs = plan_parts(25, 10).unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        for n in [2, 3, 1] {
            tx.send(success(n)).await.unwrap();
        }
        drop(tx);

        let parts = ResultAggregator::new(&jobs).drain(&mut rx).await.unwrap();
        assert_eq!(parts.len(), 3);
    }
}
