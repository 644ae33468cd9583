//! Error types for the memory core.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced by memory operations.
///
/// Missing data (an unknown entity, a day without a log, empty curated
/// memory) is never an error; those reads return empty values.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Fact database or search index failure.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid agent name {0:?}")]
    InvalidAgent(String),

    #[error("Invalid entity name {0:?}")]
    InvalidEntity(String),

    #[error("Invalid core memory section {0:?}")]
    InvalidSection(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl MemoryError {
    /// Map an I/O error on `path`, for use with `map_err`.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for memory operations.
pub type MemoryResult<T> = std::result::Result<T, MemoryError>;
