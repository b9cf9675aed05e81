//! One row of the `files` table — the unit everything else queries over.

use serde::{Deserialize, Serialize};

/// A single cataloged file.
///
/// Records are created and populated by the out-of-process scanner; this
/// engine only reads them and updates the two SHA256 fields in place. It
/// never inserts, deletes, or touches any other field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Stable integer identity assigned at catalog time. Immutable, never reused.
    pub id: i64,

    /// Absolute path, unique within the catalog. Separator-consistent with
    /// the catalog's origin OS (`/` or `\`), which is why nothing in this
    /// crate assumes a fixed separator.
    pub path: String,

    /// Final path segment. Derivable from `path` but stored for query speed.
    pub filename: String,

    /// Lower-cased suffix without the dot. `None` for extensionless files.
    pub extension: Option<String>,

    /// Logical file size in bytes.
    pub size_bytes: u64,

    /// Creation time, epoch seconds. Absent on filesystems that don't track it.
    pub created_at: Option<i64>,

    /// Last-modified time, epoch seconds. Absent on some filesystems.
    pub modified_at: Option<i64>,

    /// Weak content fingerprint, computed for every file at scan time.
    /// Equal values mean *candidate* duplicates, not proof.
    pub md5_hash: String,

    /// Strong content hash. Populated only by the verification flow.
    pub sha256_hash: Option<String>,

    /// True exactly when `sha256_hash` was produced by verification.
    pub sha256_verified: bool,
}

impl FileRecord {
    /// Case-insensitive extension membership test, used by the heuristic
    /// rules. Extensionless records never match.
    pub fn extension_in(&self, set: &[&str]) -> bool {
        self.extension
            .as_deref()
            .is_some_and(|ext| set.iter().any(|s| ext.eq_ignore_ascii_case(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(extension: Option<&str>) -> FileRecord {
        FileRecord {
            id: 1,
            path: "/tmp/x".into(),
            filename: "x".into(),
            extension: extension.map(String::from),
            size_bytes: 0,
            created_at: None,
            modified_at: None,
            md5_hash: "d41d8cd98f00b204e9800998ecf8427e".into(),
            sha256_hash: None,
            sha256_verified: false,
        }
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert!(record(Some("tmp")).extension_in(&["tmp", "temp"]));
        assert!(record(Some("TMP")).extension_in(&["tmp"]));
        assert!(!record(Some("txt")).extension_in(&["tmp", "temp"]));
    }

    #[test]
    fn missing_extension_never_matches() {
        assert!(!record(None).extension_in(&["tmp"]));
    }
}
