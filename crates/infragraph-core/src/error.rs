use thiserror::Error;

/// Top-level error type for the Infragraph platform.
#[derive(Error, Debug)]
pub enum InfragraphError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Connector error: {source}")]
    Connector {
        connector: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
