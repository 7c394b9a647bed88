//! Unified error handling for the CLI.

use std::path::PathBuf;

/// Application error type.
///
/// These are fatal for the command being run. Problems with individual
/// input documents are recorded in the report instead.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{} is not a dealer collection: {reason}", path.display())]
    NotACollection { path: PathBuf, reason: String },

    #[error("no dealer files matching *{suffix} in {}", dir.display())]
    NoDealerFiles { dir: PathBuf, suffix: String },

    #[error("no valid dealer data found to combine")]
    NothingToCombine,

    #[error("Engine error: {0}")]
    Engine(#[from] dealer_engine::Error),
}

/// Result type alias for commands.
pub type Result<T> = std::result::Result<T, CliError>;
