//! pdrive - upload files to a pdrive server
//!
//! Small files go up in one request; larger files are split into parts that
//! are uploaded concurrently.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::upload::UploadOptions;
use commands::CommandContext;
use config::Config;

#[derive(Parser)]
#[command(name = "pdrive")]
#[command(version = pdrive_core::VERSION)]
#[command(about = "Upload files to a pdrive server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PDRIVE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "PDRIVE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Only print the resulting URL
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and print its URL
    Upload {
        /// File to upload
        file: PathBuf,

        /// Number of parts uploaded at the same time
        #[arg(short, long)]
        workers: Option<usize>,

        /// Part size in bytes; files larger than this are uploaded in parts
        #[arg(long)]
        part_size: Option<u64>,

        /// Stop uploading remaining parts once one fails
        #[arg(long)]
        cancel_on_failure: bool,

        /// Disable progress bars
        #[arg(long)]
        no_progress: bool,
    },

    /// Manage configuration
    Configure {
        #[command(subcommand)]
        action: Option<ConfigureAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigureAction {
    /// Set a configuration value
    Set { key: String, value: String },

    /// Get a configuration value
    Get { key: String },

    /// List all configuration values
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the URL
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    let ctx = CommandContext {
        config,
        config_path,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Upload {
            file,
            workers,
            part_size,
            cancel_on_failure,
            no_progress,
        } => {
            let opts = UploadOptions {
                file,
                workers,
                part_size,
                cancel_on_failure,
                show_progress: !no_progress,
            };
            commands::upload::execute(&ctx, opts).await
        }
        Commands::Configure { action } => commands::configure::execute(&ctx, action).await,
    }
}
