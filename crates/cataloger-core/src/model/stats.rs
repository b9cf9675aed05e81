//! Pass-through catalog statistics.
//!
//! These are direct aggregations over the `files` table with no algorithmic
//! content; they exist so front-ends can render an overview without issuing
//! raw SQL themselves.

use serde::Serialize;

use super::size::format_size;

/// Per-extension count and size totals. The store returns the top entries
/// ordered by total size descending.
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionStat {
    /// The extension, or `None` for extensionless files.
    pub extension: Option<String>,
    pub count: u64,
    pub total_bytes: u64,
}

/// A lightweight file row for "largest files" style listings.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub filename: String,
    pub size_bytes: u64,
}

/// Overall catalog statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total_files: u64,
    pub total_bytes: u64,
    /// Human-readable rendering of `total_bytes`.
    pub total_display: String,
    /// Top extensions by total size.
    pub extensions: Vec<ExtensionStat>,
    /// Top individual files by size.
    pub largest_files: Vec<FileSummary>,
}

impl CatalogStats {
    pub fn new(
        total_files: u64,
        total_bytes: u64,
        extensions: Vec<ExtensionStat>,
        largest_files: Vec<FileSummary>,
    ) -> Self {
        Self {
            total_files,
            total_bytes,
            total_display: format_size(total_bytes),
            extensions,
            largest_files,
        }
    }
}
