//! Error taxonomy for catalog operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the catalog engine.
///
/// Self-healing paths (schema mismatch, stale cache, unparseable config
/// files) are deliberately absent here: those are recovered from in place
/// and only logged. What remains is what a caller can meaningfully react to.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A collection or category with this name already exists.
    #[error("name already in use: {0}")]
    NameCollision(String),

    /// The named family is not present in the catalog.
    #[error("no such family: {0}")]
    UnknownFamily(String),

    /// The named collection or category is not present in the catalog.
    #[error("no such collection: {0}")]
    UnknownCollection(String),

    /// Writing a persisted file failed; any previous on-disk state has been
    /// restored from its backup. The in-memory catalog is unchanged.
    #[error("failed to persist {file}: {reason}")]
    Persistence { file: PathBuf, reason: String },

    /// A long-running operation was cancelled through its token.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
