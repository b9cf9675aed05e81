/// Duplicate Detector — the two-phase duplicate-confirmation protocol.
///
/// Phase 1 ([`duplicate_candidates`]) groups records by their scan-time MD5
/// fingerprint: cheap, always available, and only ever *suspicion*. Phase 2
/// ([`verify::verify_candidates`]) re-hashes an explicitly chosen candidate
/// group with SHA256 and regroups by the fresh strong hash — the only step
/// that confers certainty.
///
/// A file's duplicate status moves forward only:
/// `unknown` (no MD5 collision) → `candidate` (MD5 collision, unverified)
/// → `confirmed` or `refuted` (post SHA256, by equality within the group).
/// Nothing in this engine reverts a verified record.
pub mod verify;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::model::FileRecord;
use crate::store::Catalog;

pub use verify::{
    verify_candidates, FailedFile, VerificationReport, VerifiedFile, VerifiedGroup,
};

/// A set of files sharing one MD5 fingerprint — suspected duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateGroup {
    /// The shared MD5 hash.
    pub fingerprint: String,
    /// Number of records in the group (always ≥ 2).
    pub count: usize,
    /// Estimated reclaimable space: `(count - 1) × size`. Valid as an
    /// estimate because equal-hash records carry equal-sized content.
    pub wasted_bytes: u64,
    pub file_ids: Vec<i64>,
    pub paths: Vec<String>,
    /// True when at least one member already carries a verified SHA256.
    pub any_verified: bool,
}

/// Phase 1: all candidate duplicate groups in the catalog, largest wasted
/// space first.
pub fn duplicate_candidates(catalog: &Catalog) -> Result<Vec<CandidateGroup>> {
    let records = catalog.records()?;
    Ok(group_candidates(&records))
}

/// Pure group-by-fingerprint over a record set.
///
/// Split out from the store access so the grouping logic is trivially
/// testable and reusable against any record source.
pub fn group_candidates(records: &[FileRecord]) -> Vec<CandidateGroup> {
    let mut by_md5: HashMap<&str, Vec<&FileRecord>> = HashMap::new();
    for record in records {
        by_md5.entry(record.md5_hash.as_str()).or_default().push(record);
    }

    let mut groups: Vec<CandidateGroup> = by_md5
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(fingerprint, mut members)| {
            members.sort_unstable_by_key(|r| r.id);
            let count = members.len();
            // Equal MD5 implies equal size for an honest fingerprint, so
            // any member's size works for the estimate.
            let size = members[0].size_bytes;
            CandidateGroup {
                fingerprint: fingerprint.to_string(),
                count,
                wasted_bytes: (count as u64 - 1) * size,
                file_ids: members.iter().map(|r| r.id).collect(),
                paths: members.iter().map(|r| r.path.clone()).collect(),
                any_verified: members.iter().any(|r| r.sha256_verified),
            }
        })
        .collect();

    // Largest reclaimable space first; fingerprint as tiebreak so the
    // ordering is stable across calls.
    groups.sort_unstable_by(|a, b| {
        b.wasted_bytes
            .cmp(&a.wasted_bytes)
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });
    groups
}
