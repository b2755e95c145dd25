//! Error types for the decorator subsystem.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecoratorError>;

/// Errors that can occur while reading, migrating, or updating decorators.
#[derive(Debug, Error)]
pub enum DecoratorError {
    /// The decorator (or legacy) file is not valid JSON of the expected shape.
    #[error("corrupt decorator file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The decorator file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the decorator file (or its support folder) failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Caller-supplied glyph was rejected before reaching the store.
    #[error("{0}")]
    Validation(String),

    /// The target path does not belong to any open workspace.
    #[error("{} is not inside an open workspace", .0.display())]
    OutsideWorkspace(PathBuf),

    /// A file watch could not be established.
    #[error("failed to watch decorators: {0}")]
    Watch(String),
}

impl DecoratorError {
    /// True for errors caused by a corrupt file on disk.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
