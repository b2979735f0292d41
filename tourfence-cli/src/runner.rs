//! Shared bootstrap for commands that run the engine.
//!
//! Loads `config.ini` and installs logging before a command does any work.

use tourfence::config::{config_file_path, ConfigFile};
use tourfence::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Log level used when `--verbose` is given.
const VERBOSE_LEVEL: &str = "debug";

/// Loaded configuration plus the live logging guard.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let mut options = config.to_logging_options();
        if verbose {
            options.level = VERBOSE_LEVEL.to_string();
        }
        let logging = init_logging(&options)?;

        Ok(Self {
            config,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            command,
            config = %config_file_path().display(),
            "tourfence starting"
        );
    }
}
