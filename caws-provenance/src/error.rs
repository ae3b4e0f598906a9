use std::path::PathBuf;

use caws_context::ContextError;

/// Errors produced by provenance operations.
///
/// Integrity faults found by verification are not errors; they are returned
/// as data on [`crate::ChainVerification`].
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt provenance chain at {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("invalid provenance entry at position {position}: {source}")]
    InvalidEntry {
        position: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProvenanceError>;
