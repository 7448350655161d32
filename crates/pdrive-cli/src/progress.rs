//! Progress bars for uploads

use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pdrive_client::{ProgressSink, ProgressTracker};

const TRANSFER_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}";

fn transfer_style() -> ProgressStyle {
    ProgressStyle::with_template(TRANSFER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// One bar per transfer, drawn together on stderr
#[derive(Clone, Default)]
pub struct BarProgress {
    multi: MultiProgress,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for BarProgress {
    fn track(&self, label: &str, total_bytes: u64) -> Arc<dyn ProgressTracker> {
        let pb = self.multi.add(ProgressBar::new(total_bytes));
        pb.set_style(transfer_style());
        pb.set_message(truncate_filename(label, 30));
        Arc::new(BarTracker(pb))
    }
}

struct BarTracker(ProgressBar);

impl ProgressTracker for BarTracker {
    fn advance(&self, bytes: u64) {
        self.0.inc(bytes);
    }

    fn finish(&self) {
        self.0.finish();
    }

    fn abandon(&self) {
        self.0.abandon_with_message("failed");
    }
}

/// Truncate filename for display
fn truncate_filename(filename: &str, max_len: usize) -> String {
    let count = filename.chars().count();
    if count <= max_len {
        filename.to_string()
    } else {
        let tail: String = filename.chars().skip(count - max_len + 3).collect();
        format!("...{}", tail)
    }
}

/// Format bytes as human readable string
pub fn format_bytes(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format duration as human readable string
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs == 0 {
        format!("{}ms", elapsed.as_millis())
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_filename() {
        assert_eq!(truncate_filename("short.txt", 20), "short.txt");
        assert_eq!(
            truncate_filename("this_is_a_very_long_filename.txt", 20),
            "...long_filename.txt"
        );
        assert_eq!(truncate_filename("ééééééé.txt", 8), "...é.txt");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1 KiB");
        assert_eq!(format_bytes(50 * 1024 * 1024), "50 MiB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
    }

    #[test]
    fn test_tracker_counts_bytes() {
        let pb = ProgressBar::hidden();
        pb.set_length(100);
        let tracker = BarTracker(pb.clone());

        tracker.advance(40);
        tracker.advance(60);
        assert_eq!(pb.position(), 100);

        tracker.finish();
        assert!(pb.is_finished());
    }
}
