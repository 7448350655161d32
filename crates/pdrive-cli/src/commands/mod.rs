//! CLI command implementations

pub mod configure;
pub mod upload;

use std::path::PathBuf;

use crate::config::Config;

/// Context passed to all commands
pub struct CommandContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub quiet: bool,
}

impl CommandContext {
    /// Print info message to stderr if not quiet
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg);
        }
    }
}
