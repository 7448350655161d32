//! upload command - send one file to pdrive

use super::CommandContext;
use crate::config::Config;
use crate::progress::{format_bytes, format_duration, BarProgress};
use anyhow::{Context, Result};
use colored::Colorize;
use pdrive_client::{UploadConfig, UploadMethod, Uploader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub struct UploadOptions {
    pub file: PathBuf,
    pub workers: Option<usize>,
    pub part_size: Option<u64>,
    pub cancel_on_failure: bool,
    pub show_progress: bool,
}

/// Apply command-line overrides on top of the loaded config.
///
/// `--part-size` moves the multipart threshold along with it unless the
/// config file sets `multipart_threshold` explicitly.
fn upload_config(config: &Config, opts: &UploadOptions) -> Result<UploadConfig> {
    let mut upload = config.to_upload_config()?;
    if let Some(workers) = opts.workers {
        upload = upload.with_workers(workers);
    }
    if let Some(part_size) = opts.part_size {
        upload = upload.with_part_size(part_size);
        if let Some(threshold) = config.multipart_threshold {
            upload = upload.with_multipart_threshold(threshold);
        }
    }
    if opts.cancel_on_failure {
        upload = upload.with_cancel_on_failure(true);
    }
    Ok(upload)
}

pub async fn execute(ctx: &CommandContext, opts: UploadOptions) -> Result<()> {
    let config = upload_config(&ctx.config, &opts)?;

    let mut uploader = Uploader::with_transport(config, ctx.config.transport_config())
        .context("Invalid upload configuration")?;
    if opts.show_progress && !ctx.quiet {
        uploader = uploader.with_progress(Arc::new(BarProgress::new()));
    }

    let started = Instant::now();
    let report = uploader
        .upload_file(&opts.file)
        .await
        .with_context(|| format!("Failed to upload {}", opts.file.display()))?;

    let method = match report.method {
        UploadMethod::Single => String::new(),
        UploadMethod::Multipart { parts } => format!(" in {} parts", parts),
    };
    ctx.info(&format!(
        "{} Uploaded {} ({}){} in {}",
        "✓".green(),
        opts.file.display(),
        format_bytes(report.bytes),
        method,
        format_duration(started.elapsed())
    ));

    println!("{}", report.url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(part_size: Option<u64>) -> UploadOptions {
        UploadOptions {
            file: PathBuf::from("movie.mkv"),
            workers: Some(4),
            part_size,
            cancel_on_failure: true,
            show_progress: false,
        }
    }

    fn config(threshold: Option<u64>) -> Config {
        Config {
            token: Some("t".to_string()),
            api_url: Some("http://localhost:8080".to_string()),
            multipart_threshold: threshold,
            ..Config::default()
        }
    }

    #[test]
    fn test_part_size_flag_keeps_configured_threshold() {
        let upload = upload_config(&config(Some(10_000)), &options(Some(1000))).unwrap();
        assert_eq!(upload.part_size, 1000);
        assert_eq!(upload.multipart_threshold, 10_000);
        assert_eq!(upload.workers, 4);
        assert!(upload.cancel_on_failure);
    }

    #[test]
    fn test_part_size_flag_moves_default_threshold() {
        let upload = upload_config(&config(None), &options(Some(1000))).unwrap();
        assert_eq!(upload.part_size, 1000);
        assert_eq!(upload.multipart_threshold, 1000);
    }

    #[test]
    fn test_no_overrides() {
        let upload = upload_config(&config(Some(7)), &options(None)).unwrap();
        assert_eq!(upload.part_size, pdrive_core::DEFAULT_PART_SIZE);
        assert_eq!(upload.multipart_threshold, 7);
    }
}
