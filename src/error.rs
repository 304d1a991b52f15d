//! Error types for asset loading and persisted state.
//!
//! Neither error crosses the public typing API: callers of
//! [`crate::engine::TypingEngine`] see an empty dictionary or an empty table
//! instead, and the error is logged.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("asset {0} contained no valid entries")]
    Empty(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed table {table}: {reason}")]
    Malformed { table: String, reason: String },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no data directory available for persisted state")]
    NoDataDir,
}
