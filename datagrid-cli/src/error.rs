//! CLI error type

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Grid(#[from] datagrid::Error),

    #[error(transparent)]
    Config(#[from] datagrid::error::ConfigError),

    #[error("Failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
