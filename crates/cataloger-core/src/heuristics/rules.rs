//! The fixed rule set.
//!
//! Rules 1–2 flag individual files by extension (and age). Rules 3–4 flag
//! well-known folder names and aggregate everything under each distinct
//! folder root into a single suggestion, so ten thousand files under one
//! `node_modules` surface as one entry with the summed size.

use std::collections::BTreeMap;

use chrono::Duration;

use super::{Suggestion, SuggestionAction, SuggestionTarget};
use crate::model::FileRecord;

/// Extensions treated as disposable temp artifacts.
pub const TEMP_EXTENSIONS: [&str; 3] = ["tmp", "temp", "chk"];

/// Extensions flagged for archiving once stale.
pub const STALE_EXTENSIONS: [&str; 4] = ["log", "bak", "old", "dmp"];

/// Age threshold for the stale-log rule.
pub const STALE_AGE_DAYS: i64 = 30;

/// Dependency/build directory names. Matched as whole path segments.
pub const DEV_FOLDERS: [&str; 6] = ["node_modules", "venv", ".venv", "target", "dist", "build"];

/// Cache directory names. Matched as whole path segments.
pub const CACHE_FOLDERS: [&str; 4] = ["__pycache__", ".cache", ".pytest_cache", ".mypy_cache"];

/// Rule 1 — temp files: one `delete` suggestion per matching file.
pub fn temp_files(records: &[FileRecord]) -> Vec<Suggestion> {
    records
        .iter()
        .filter(|r| r.extension_in(&TEMP_EXTENSIONS))
        .map(|r| Suggestion {
            path: r.path.clone(),
            target: SuggestionTarget::File,
            reason: "Temporary file".to_string(),
            action: SuggestionAction::Delete,
            size_bytes: r.size_bytes,
            confidence: 1.0,
        })
        .collect()
}

/// Rule 2 — stale logs/backups: `archive` for matching extensions not
/// modified within [`STALE_AGE_DAYS`]. Records without a modification
/// timestamp never match — absence of evidence is not staleness.
pub fn stale_logs(records: &[FileRecord], now: i64) -> Vec<Suggestion> {
    let cutoff = now - Duration::days(STALE_AGE_DAYS).num_seconds();
    records
        .iter()
        .filter(|r| r.extension_in(&STALE_EXTENSIONS))
        .filter(|r| r.modified_at.is_some_and(|modified| modified < cutoff))
        .map(|r| Suggestion {
            path: r.path.clone(),
            target: SuggestionTarget::File,
            reason: format!("Old log/backup file (> {STALE_AGE_DAYS} days)"),
            action: SuggestionAction::Archive,
            size_bytes: r.size_bytes,
            confidence: 1.0,
        })
        .collect()
}

/// Rule 3 — dependency/build folders: one `ignore` suggestion per distinct
/// folder root, sized as the sum of everything under it.
pub fn dev_folders(records: &[FileRecord]) -> Vec<Suggestion> {
    folder_rule(
        records,
        &DEV_FOLDERS,
        SuggestionAction::Ignore,
        "Dependency/build folder",
    )
}

/// Rule 4 — cache folders: same aggregation, `delete` action.
pub fn cache_folders(records: &[FileRecord]) -> Vec<Suggestion> {
    folder_rule(
        records,
        &CACHE_FOLDERS,
        SuggestionAction::Delete,
        "Cache folder",
    )
}

fn folder_rule(
    records: &[FileRecord],
    folders: &[&str],
    action: SuggestionAction,
    reason_prefix: &str,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for folder in folders {
        // Group by exact root string; BTreeMap keeps output deterministic.
        let mut roots: BTreeMap<String, u64> = BTreeMap::new();
        for record in records {
            if let Some(root) = folder_root(&record.path, folder) {
                *roots.entry(root.to_string()).or_insert(0) += record.size_bytes;
            }
        }
        for (root, total_size) in roots {
            suggestions.push(Suggestion {
                path: root,
                target: SuggestionTarget::Folder,
                reason: format!("{reason_prefix} ({folder})"),
                action,
                size_bytes: total_size,
                confidence: 1.0,
            });
        }
    }

    suggestions
}

/// The root path of the *first* occurrence of `folder` as a whole path
/// segment, including the folder name itself
/// (`C:\Project\node_modules\x\y.js` → `C:\Project\node_modules`).
///
/// Segment-bounded on both sides so `dist` never matches inside
/// `my_dist_files`, and first-occurrence so a `dist` nested inside another
/// `dist` aggregates to the outer root.
fn folder_root<'a>(path: &'a str, folder: &str) -> Option<&'a str> {
    let backslash = format!("\\{folder}\\");
    let slash = format!("/{folder}/");

    let hit = match (path.find(&backslash), path.find(&slash)) {
        (Some(b), Some(s)) => Some(b.min(s)),
        (Some(b), None) => Some(b),
        (None, Some(s)) => Some(s),
        (None, None) => None,
    }?;

    // One separator byte plus the folder name.
    Some(&path[..hit + 1 + folder.len()])
}
