//! Error types for project operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::base::FileId;

/// Errors raised while loading or managing project documents.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a document or listing a directory failed.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory to load does not exist or is not a directory.
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Walking a directory tree failed.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// No open document has this id.
    #[error("Unknown file: {0}")]
    UnknownFile(FileId),

    /// No open document has this path.
    #[error("Unknown path: {}", .0.display())]
    UnknownPath(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
