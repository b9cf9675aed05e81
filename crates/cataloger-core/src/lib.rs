/// Cataloger Core — catalog queries, duplicate verification, and cleanup heuristics.
///
/// This crate contains all business logic with zero transport dependencies.
/// It is designed to be reusable across different front-ends (CLI, HTTP API).
/// Every operation is stateless: it computes against the current catalog
/// snapshot and holds nothing across requests.
///
/// # Modules
///
/// - [`model`] — File records, catalog statistics, and size formatting.
/// - [`store`] — SQLite-backed catalog store (read queries + SHA256 updates).
/// - [`paths`] — Separator detection and path splitting over mixed-OS paths.
/// - [`tree`] — Lazy one-level-at-a-time directory tree reconstruction.
/// - [`duplicates`] — Two-phase duplicate detection: MD5 candidate grouping,
///   then selective SHA256 verification.
/// - [`heuristics`] — Rule-based cleanup suggestions.
/// - [`monitor`] — Consumer for the external scanner's progress file.
pub mod duplicates;
pub mod error;
pub mod heuristics;
pub mod model;
pub mod monitor;
pub mod paths;
pub mod store;
pub mod tree;

pub use error::{CatalogError, Result};
pub use model::FileRecord;
pub use store::Catalog;
