//! Phase 2 — selective SHA256 verification of one candidate group.
//!
//! Files are streamed through the digest in fixed-size chunks so arbitrary
//! sizes never load into memory, hashed on a worker pool with a fixed
//! concurrency cap, and persisted one by one. A file that fails to read
//! (moved, deleted, permission-denied since the scan) is reported with its
//! reason and never blocks its siblings. The batch runs to completion;
//! there is no caller-visible cancellation.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{CatalogError, Result};
use crate::store::Catalog;

/// Fixed read-chunk size for streaming hashes.
pub const HASH_CHUNK_SIZE: usize = 8192;

/// Upper bound on concurrent hash workers. The effective pool size is the
/// smaller of this and the machine's core count.
pub const MAX_HASH_WORKERS: usize = 8;

/// One successfully verified file.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedFile {
    pub id: i64,
    pub path: String,
    pub sha256: String,
}

/// Files from the batch sharing one freshly computed SHA256.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedGroup {
    pub content_hash: String,
    pub files: Vec<VerifiedFile>,
    pub count: usize,
    /// True when more than one file hashed to `content_hash` — genuine,
    /// cryptographically confirmed duplication.
    pub is_duplicate: bool,
}

/// A file from the batch that could not be verified.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub id: i64,
    pub path: String,
    pub error: String,
}

/// Outcome of one verification batch. `total` always equals
/// `successful + failed`; no requested file is ever silently dropped.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    /// The MD5 fingerprint of the candidate group this batch came from.
    pub fingerprint: String,
    pub verified_groups: Vec<VerifiedGroup>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub failures: Vec<FailedFile>,
}

/// Verify the `(id, path)` members of one MD5 candidate group.
///
/// Every file is re-hashed with SHA256 and the result persisted through
/// [`Catalog::update_sha256`]. The batch is then regrouped by the *fresh*
/// SHA256 values — not the original MD5 — because a shared weak hash does
/// not prove identical bytes; only equal strong hashes within the group do.
///
/// Hashing runs in parallel but the report lists groups and failures in
/// input order. Idempotent: re-running the same unchanged batch produces
/// identical hashes and groupings. A store failure is fatal for the request
/// (`StorageUnavailable`); per-file read failures are not.
pub fn verify_candidates(
    catalog: &Catalog,
    fingerprint: &str,
    files: &[(i64, String)],
) -> Result<VerificationReport> {
    info!(
        "Verifying {} candidate file(s) for fingerprint {fingerprint}",
        files.len()
    );

    let workers = MAX_HASH_WORKERS.min(num_cpus::get()).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .expect("failed to build hash worker pool");

    // par_iter + collect preserves input order regardless of completion order.
    let digests: Vec<std::result::Result<String, CatalogError>> =
        pool.install(|| files.par_iter().map(|(_, path)| hash_file(Path::new(path))).collect());

    let mut groups: Vec<VerifiedGroup> = Vec::new();
    let mut group_index: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();
    let mut failures: Vec<FailedFile> = Vec::new();

    for ((id, path), digest) in files.iter().zip(digests) {
        match digest {
            Ok(sha256) => {
                // Persisted before it is reported.
                if catalog.update_sha256(*id, &sha256)? {
                    let at = *group_index.entry(sha256.clone()).or_insert_with(|| {
                        groups.push(VerifiedGroup {
                            content_hash: sha256.clone(),
                            files: Vec::new(),
                            count: 0,
                            is_duplicate: false,
                        });
                        groups.len() - 1
                    });
                    groups[at].files.push(VerifiedFile {
                        id: *id,
                        path: path.clone(),
                        sha256,
                    });
                } else {
                    // Id no longer present — the catalog was rebuilt since
                    // the candidate listing. Reported, not dropped.
                    failures.push(FailedFile {
                        id: *id,
                        path: path.clone(),
                        error: "record no longer exists in catalog".to_string(),
                    });
                }
            }
            Err(err) => {
                warn!("Verification failed for {path}: {err}");
                failures.push(FailedFile {
                    id: *id,
                    path: path.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    for group in &mut groups {
        group.count = group.files.len();
        group.is_duplicate = group.count > 1;
    }

    let successful = files.len() - failures.len();
    info!(
        "Verification for {fingerprint} complete: {successful} ok, {} failed, {} group(s)",
        failures.len(),
        groups.len()
    );

    Ok(VerificationReport {
        fingerprint: fingerprint.to_string(),
        verified_groups: groups,
        total: files.len(),
        successful,
        failed: failures.len(),
        failures,
    })
}

/// Stream one file through SHA256 in [`HASH_CHUNK_SIZE`] chunks.
///
/// Fails fast with [`CatalogError::UnreadableFile`] on the first I/O error;
/// the caller isolates the failure to this file.
pub fn hash_file(path: &Path) -> std::result::Result<String, CatalogError> {
    let unreadable = |err: std::io::Error| CatalogError::UnreadableFile {
        path: path.display().to_string(),
        reason: err.to_string(),
    };

    let file = File::open(path).map_err(unreadable)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];

    loop {
        let count = reader.read(&mut buffer).map_err(unreadable)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hash_file_matches_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.bin");
        File::create(&path).unwrap().write_all(b"abc").unwrap();

        assert_eq!(
            hash_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_file_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        File::create(&path).unwrap();

        assert_eq!(
            hash_file(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hash_file_streams_multiple_chunks() {
        // Two chunks plus a partial third exercise the read loop.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data = vec![0x5au8; HASH_CHUNK_SIZE * 2 + 17];
        File::create(&path).unwrap().write_all(&data).unwrap();

        let streamed = hash_file(&path).unwrap();
        let whole = format!("{:x}", Sha256::digest(&data));
        assert_eq!(streamed, whole);
    }

    #[test]
    fn missing_file_is_unreadable_not_a_panic() {
        let err = hash_file(Path::new("/no/such/file.bin")).unwrap_err();
        match err {
            CatalogError::UnreadableFile { ref path, .. } => {
                assert!(path.contains("no/such"));
            }
            other => panic!("expected UnreadableFile, got {other:?}"),
        }
    }
}
