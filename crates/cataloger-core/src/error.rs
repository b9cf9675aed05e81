//! Error kinds for catalog operations.
//!
//! Three failure classes with very different blast radii:
//! - [`CatalogError::EmptyCatalog`] — nothing to query; tree callers render
//!   this as an empty result, never as a hard failure.
//! - [`CatalogError::UnreadableFile`] — isolated to one file inside a
//!   verification batch; siblings keep going.
//! - [`CatalogError::StorageUnavailable`] — the store itself is gone; fatal
//!   for the current request, not retried internally.

use thiserror::Error;

/// Errors surfaced by the catalog engine.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog has zero records, so there is no separator to detect and
    /// no tree to build.
    #[error("catalog contains no records")]
    EmptyCatalog,

    /// A file could not be opened or read during SHA256 verification
    /// (moved, deleted, or permission-denied since the scan).
    #[error("cannot read {path}: {reason}")]
    UnreadableFile { path: String, reason: String },

    /// The underlying SQLite store could not be reached or a query failed.
    #[error("catalog store unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CatalogError>;
