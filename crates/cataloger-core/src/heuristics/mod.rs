/// Heuristic Classifier — rule-based cleanup suggestions.
///
/// A small, fixed, ordered set of independent rules scans the catalog and
/// emits suggestions. Rules are pure: they read already-loaded records and
/// never mutate anything, so a suggestion pass cannot fail once the records
/// are in hand. A malformed path simply fails to match.
pub mod rules;

use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::store::Catalog;

pub use rules::{CACHE_FOLDERS, DEV_FOLDERS, STALE_AGE_DAYS, STALE_EXTENSIONS, TEMP_EXTENSIONS};

/// What a suggestion points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionTarget {
    File,
    Folder,
}

/// What the caller should do about it. The engine only suggests; acting on
/// a suggestion is entirely the caller's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionAction {
    Delete,
    Archive,
    Ignore,
}

/// One cleanup suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    /// File path, or folder-root path for the aggregating rules.
    pub path: String,
    #[serde(rename = "type")]
    pub target: SuggestionTarget,
    /// Human-readable explanation of why this was flagged.
    pub reason: String,
    pub action: SuggestionAction,
    /// File size, or the summed size of everything under a folder root.
    pub size_bytes: u64,
    /// 1.0 for the current exact rules; the slot exists so future
    /// probabilistic rules can report lower certainty.
    pub confidence: f32,
}

/// Run every rule against the current catalog snapshot.
pub fn get_suggestions(catalog: &Catalog) -> Result<Vec<Suggestion>> {
    let records = catalog.records()?;
    Ok(run_rules(&records, Utc::now().timestamp()))
}

/// Rule pass over an already-loaded record set.
///
/// `now` is injected (epoch seconds) so age thresholds are testable.
/// Rule order is fixed but has no semantic weight — suggestions are
/// independent per target.
pub fn run_rules(records: &[crate::model::FileRecord], now: i64) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    suggestions.extend(rules::temp_files(records));
    suggestions.extend(rules::stale_logs(records, now));
    suggestions.extend(rules::dev_folders(records));
    suggestions.extend(rules::cache_folders(records));
    suggestions
}
