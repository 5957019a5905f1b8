use std::path::PathBuf;

use thiserror::Error;

use super::NoteId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("note not found: {0}")]
    NotFound(String),

    #[error("{0} has no child notes")]
    NoChildren(NoteId),

    #[error("line {line} is outside {id}")]
    LineOutOfRange { id: NoteId, line: usize },

    #[error("notes directory does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
