//! Error types

use std::path::PathBuf;

use tabula::{ConfigError, CustomizationError, WriteError};
use thiserror::Error;

/// Failure reading or writing a record file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid record file: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record that parsed but does not fit the table's row shape.
    #[error("record {index}: {message}")]
    Shape { index: usize, message: String },
}

/// Top-level error of a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("invalid customization: {0}")]
    Customization(#[from] CustomizationError),

    #[error("no cell named '{0}'")]
    UnknownCell(String),

    #[error("cannot edit cell: {0}")]
    Write(#[from] WriteError),

    #[error("cell '{name}' expects a number, got '{value}'")]
    NotANumber { name: String, value: String },

    #[error("'{0}' has no filter input")]
    UnknownFilter(String),

    #[error("no data directory could be determined; pass --data-dir")]
    NoDataDir,

    #[error("cannot prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
