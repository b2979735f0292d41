//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;
use tourfence::config::ConfigFileError;
use tourfence::logging::LoggingError;
use tourfence::poi::CatalogError;
use tourfence::session::SessionError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error("Failed to initialise logging: {0}")]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to read samples from {path}: {source}")]
    SamplesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    SamplesParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid coordinates: {0}")]
    Coordinates(#[from] tourfence::CoordError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}
