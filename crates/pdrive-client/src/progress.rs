//! Progress reporting hooks
//!
//! Trackers only observe the bytes flowing through a request body; they never
//! alter the stream or its errors.

use std::sync::Arc;

use futures::stream::StreamExt;

use crate::source::ByteStream;

/// Receives byte counts for one transfer
pub trait ProgressTracker: Send + Sync {
    /// Record `bytes` more bytes read from the source
    fn advance(&self, bytes: u64);

    /// The transfer completed successfully
    fn finish(&self);

    /// The transfer failed or was cancelled
    fn abandon(&self) {}
}

/// Creates a tracker per transfer
pub trait ProgressSink: Send + Sync {
    fn track(&self, label: &str, total_bytes: u64) -> Arc<dyn ProgressTracker>;
}

/// Sink that discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressTracker for NoProgress {
    fn advance(&self, _bytes: u64) {}

    fn finish(&self) {}
}

impl ProgressSink for NoProgress {
    fn track(&self, _label: &str, _total_bytes: u64) -> Arc<dyn ProgressTracker> {
        Arc::new(NoProgress)
    }
}

/// Report every chunk of `stream` to `tracker`
pub fn track_stream(stream: ByteStream, tracker: Arc<dyn ProgressTracker>) -> ByteStream {
    stream
        .inspect(move |chunk| {
            if let Ok(bytes) = chunk {
                tracker.advance(bytes.len() as u64);
            }
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Counter(AtomicU64);

    impl ProgressTracker for Counter {
        fn advance(&self, bytes: u64) {
            self.0.fetch_add(bytes, Ordering::SeqCst);
        }

        fn finish(&self) {}
    }

    #[tokio::test]
    async fn test_track_stream_counts_bytes() {
        let counter = Arc::new(Counter::default());
        let chunks: Vec<std::io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"defgh")),
        ];
        let stream = futures::stream::iter(chunks).boxed();

        let mut tracked = track_stream(stream, counter.clone());
        let mut seen = Vec::new();
        while let Some(chunk) = tracked.next().await {
            seen.extend_from_slice(&chunk.unwrap());
        }

        assert_eq!(seen, b"abcdefgh");
        assert_eq!(counter.0.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_track_stream_passes_errors_through() {
        let counter = Arc::new(Counter::default());
        let chunks: Vec<std::io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
        ];
        let mut tracked = track_stream(futures::stream::iter(chunks).boxed(), counter.clone());

        assert!(tracked.next().await.unwrap().is_ok());
        assert!(tracked.next().await.unwrap().is_err());
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }
}
