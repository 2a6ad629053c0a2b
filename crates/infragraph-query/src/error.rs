//! Error types for the infragraph-query crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Traversal depth must be at least 1, got {depth}")]
    InvalidDepth { depth: usize },

    #[error("Store error: {0}")]
    Store(#[from] infragraph_store::StoreError),
}

pub type Result<T> = std::result::Result<T, QueryError>;
