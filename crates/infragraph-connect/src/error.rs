//! Error types for the infragraph-connect crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    /// The source file does not exist or is not a regular file.
    #[error("Source file not found: {path}")]
    NotFound { path: PathBuf },

    /// The file exists but does not parse as the expected structure.
    #[error("Invalid format in {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] infragraph_store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConnectError>;

impl ConnectError {
    /// Shorthand for format failures carrying the offending path.
    pub fn invalid(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
