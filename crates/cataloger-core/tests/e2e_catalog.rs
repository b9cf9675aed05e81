//! End-to-end engine tests against real on-disk catalogs.
//!
//! These tests exercise the full request path — a file-backed SQLite
//! catalog, real files on a temporary filesystem, real SHA256 streaming —
//! with zero mocking.
//!
//! **Why a `tests/` integration test (not unit tests)?**
//!
//! The catalog is seeded exactly the way the out-of-process scanner seeds
//! it: a plain SQLite connection writing rows against the schema contract,
//! then a fresh `Catalog` opened on the same file. Unit tests cover each
//! component's logic in isolation; these tests prove the contracts hold
//! across the process boundary the production system actually has.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use cataloger_core::duplicates::{duplicate_candidates, verify_candidates};
use cataloger_core::heuristics::{self, SuggestionAction};
use cataloger_core::tree::{get_tree, EntryKind};
use cataloger_core::Catalog;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A row to seed: (path, size_bytes, md5, extension, modified_at).
type SeedRow<'a> = (&'a str, u64, &'a str, Option<&'a str>, Option<i64>);

/// Create `catalog.db` under `dir`, seeded through a raw SQLite connection
/// exactly as the external scanner would, and return an opened `Catalog`.
fn seeded_catalog(dir: &Path, rows: &[SeedRow<'_>]) -> Catalog {
    let db_path = dir.join("catalog.db");

    // Schema first, through the engine's own contract.
    let catalog = Catalog::open(&db_path).expect("create catalog db");
    catalog.init_schema().expect("init schema");
    drop(catalog);

    // Seed as the scanner: a separate plain connection.
    let conn = rusqlite::Connection::open(&db_path).expect("open raw connection");
    for (path, size, md5, extension, modified_at) in rows {
        let filename = path.rsplit(['/', '\\']).next().unwrap_or(path);
        conn.execute(
            "INSERT INTO files
             (path, filename, extension, size_bytes, created_at, modified_at,
              md5_hash, sha256_hash, sha256_verified)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, NULL, 0)",
            rusqlite::params![path, filename, extension, *size as i64, modified_at, md5],
        )
        .expect("seed row");
    }
    drop(conn);

    Catalog::open(&db_path).expect("reopen catalog")
}

/// Write a real file with the given contents and return its path string.
fn write_file(dir: &Path, name: &str, contents: &[u8]) -> String {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).expect("create data file");
    file.write_all(contents).expect("write data file");
    path.to_string_lossy().into_owned()
}

fn id_of(catalog: &Catalog, path: &str) -> i64 {
    catalog
        .records()
        .expect("records")
        .iter()
        .find(|r| r.path == path)
        .expect("record by path")
        .id
}

// ── Tree reconstruction ──────────────────────────────────────────────────────

/// The canonical one-level scenario: a 300-byte subdirectory sorts before a
/// 50-byte direct file, sizes aggregated recursively.
#[test]
fn tree_level_aggregates_and_orders() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let catalog = seeded_catalog(
        tmp.path(),
        &[
            ("/a/b/x.txt", 100, "m1", Some("txt"), None),
            ("/a/b/y.txt", 200, "m2", Some("txt"), None),
            ("/a/c.txt", 50, "m3", Some("txt"), None),
        ],
    );

    let level = get_tree(&catalog, "/a").expect("tree level");
    assert_eq!(level.path, "/a");
    assert_eq!(level.children.len(), 2);

    assert_eq!(level.children[0].name, "b");
    assert_eq!(level.children[0].kind, EntryKind::Dir);
    assert_eq!(level.children[0].size, 300);
    assert!(level.children[0].has_children);

    assert_eq!(level.children[1].name, "c.txt");
    assert_eq!(level.children[1].kind, EntryKind::File);
    assert_eq!(level.children[1].size, 50);
    assert!(!level.children[1].has_children);
}

/// Boundary: a root request on an empty catalog is an empty level, never
/// an error.
#[test]
fn empty_catalog_tree_is_empty() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let catalog = seeded_catalog(tmp.path(), &[]);

    let level = get_tree(&catalog, "").expect("tree level");
    assert_eq!(level.path, "");
    assert!(level.children.is_empty());
}

/// Prefix correctness across a realistic mixed layout: every child lies
/// strictly under the parent.
#[test]
fn tree_children_always_start_with_parent_prefix() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let catalog = seeded_catalog(
        tmp.path(),
        &[
            ("/home/u/docs/a.txt", 1, "m1", Some("txt"), None),
            ("/home/u/docs/deep/b.txt", 2, "m2", Some("txt"), None),
            ("/home/u/docsx/c.txt", 4, "m3", Some("txt"), None),
            ("/home/v/d.txt", 8, "m4", Some("txt"), None),
        ],
    );

    let level = get_tree(&catalog, "/home/u/docs").expect("tree level");
    assert_eq!(level.children.len(), 2);
    for child in &level.children {
        assert!(child.path.starts_with("/home/u/docs/"), "{}", child.path);
    }
}

// ── Two-phase duplicate verification ─────────────────────────────────────────

/// Two-phase soundness: records sharing an MD5 whose real contents differ
/// must land in distinct singleton SHA256 groups, each refuted.
#[test]
fn md5_collision_with_different_content_is_refuted() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_a = write_file(tmp.path(), "a.bin", b"first contents");
    let path_b = write_file(tmp.path(), "b.bin", b"second contents");

    // Same fingerprint in the catalog — a simulated weak-hash collision.
    let catalog = seeded_catalog(
        tmp.path(),
        &[
            (path_a.as_str(), 14, "abc", Some("bin"), None),
            (path_b.as_str(), 15, "abc", Some("bin"), None),
        ],
    );

    let candidates = duplicate_candidates(&catalog).expect("candidates");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].count, 2);
    assert!(!candidates[0].any_verified);

    let files: Vec<(i64, String)> = vec![
        (id_of(&catalog, &path_a), path_a.clone()),
        (id_of(&catalog, &path_b), path_b.clone()),
    ];
    let report = verify_candidates(&catalog, "abc", &files).expect("verify");

    assert_eq!(report.total, 2);
    assert_eq!(report.successful, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.verified_groups.len(), 2);
    for group in &report.verified_groups {
        assert_eq!(group.count, 1);
        assert!(!group.is_duplicate, "differing content must be refuted");
    }

    // The candidate view now reports the group as carrying verified members.
    let candidates = duplicate_candidates(&catalog).expect("candidates again");
    assert!(candidates[0].any_verified);
}

/// Genuine duplicates confirm into one group, and the SHA256 fields are
/// persisted on both records.
#[test]
fn identical_content_is_confirmed_and_persisted() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_a = write_file(tmp.path(), "copy1.dat", b"same bytes everywhere");
    let path_b = write_file(tmp.path(), "copy2.dat", b"same bytes everywhere");

    let catalog = seeded_catalog(
        tmp.path(),
        &[
            (path_a.as_str(), 21, "dup", Some("dat"), None),
            (path_b.as_str(), 21, "dup", Some("dat"), None),
        ],
    );

    let files: Vec<(i64, String)> = vec![
        (id_of(&catalog, &path_a), path_a.clone()),
        (id_of(&catalog, &path_b), path_b.clone()),
    ];
    let report = verify_candidates(&catalog, "dup", &files).expect("verify");

    assert_eq!(report.verified_groups.len(), 1);
    let group = &report.verified_groups[0];
    assert_eq!(group.count, 2);
    assert!(group.is_duplicate);

    for record in catalog.records().expect("records") {
        assert!(record.sha256_verified);
        assert_eq!(record.sha256_hash.as_deref(), Some(group.content_hash.as_str()));
    }
}

/// Idempotence: verifying the same group twice yields identical hashes and
/// identical groupings.
#[test]
fn verification_is_idempotent() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_a = write_file(tmp.path(), "one.dat", b"stable contents");
    let path_b = write_file(tmp.path(), "two.dat", b"stable contents");

    let catalog = seeded_catalog(
        tmp.path(),
        &[
            (path_a.as_str(), 15, "dup", Some("dat"), None),
            (path_b.as_str(), 15, "dup", Some("dat"), None),
        ],
    );
    let files: Vec<(i64, String)> = vec![
        (id_of(&catalog, &path_a), path_a.clone()),
        (id_of(&catalog, &path_b), path_b.clone()),
    ];

    let first = verify_candidates(&catalog, "dup", &files).expect("first verify");
    let second = verify_candidates(&catalog, "dup", &files).expect("second verify");

    assert_eq!(first.verified_groups.len(), second.verified_groups.len());
    assert_eq!(
        first.verified_groups[0].content_hash,
        second.verified_groups[0].content_hash
    );
    assert_eq!(
        first.verified_groups[0].is_duplicate,
        second.verified_groups[0].is_duplicate
    );
    assert_eq!(second.successful, 2);
}

/// A file that vanished since the scan is reported as a failure with a
/// reason, while its sibling still verifies.
#[test]
fn unreadable_file_does_not_block_siblings() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_ok = write_file(tmp.path(), "still_here.dat", b"data");
    let path_gone: String = {
        let p: PathBuf = tmp.path().join("deleted_since_scan.dat");
        p.to_string_lossy().into_owned()
        // Never created on disk — the catalog is simply stale.
    };

    let catalog = seeded_catalog(
        tmp.path(),
        &[
            (path_ok.as_str(), 4, "mix", Some("dat"), None),
            (path_gone.as_str(), 4, "mix", Some("dat"), None),
        ],
    );
    let files: Vec<(i64, String)> = vec![
        (id_of(&catalog, &path_ok), path_ok.clone()),
        (id_of(&catalog, &path_gone), path_gone.clone()),
    ];

    let report = verify_candidates(&catalog, "mix", &files).expect("verify");
    assert_eq!(report.total, 2);
    assert_eq!(report.successful, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, path_gone);
    assert!(!report.failures[0].error.is_empty());

    // The surviving sibling verified and persisted.
    assert_eq!(report.verified_groups.len(), 1);
    assert_eq!(report.verified_groups[0].files[0].path, path_ok);
    let ok_record = catalog
        .records()
        .expect("records")
        .into_iter()
        .find(|r| r.path == path_ok)
        .expect("ok record");
    assert!(ok_record.sha256_verified);
}

// ── Heuristics over a seeded catalog ─────────────────────────────────────────

/// Per-root aggregation: two distinct `node_modules` roots produce exactly
/// two `ignore` suggestions, each sized from its own files only.
#[test]
fn suggestions_aggregate_per_folder_root() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let catalog = seeded_catalog(
        tmp.path(),
        &[
            ("/p1/node_modules/a/x.js", 100, "m1", Some("js"), None),
            ("/p1/node_modules/b/y.js", 200, "m2", Some("js"), None),
            ("/p2/node_modules/z.js", 50, "m3", Some("js"), None),
            ("/p1/src/main.rs", 10, "m4", Some("rs"), None),
        ],
    );

    let suggestions = heuristics::get_suggestions(&catalog).expect("suggestions");
    let ignores: Vec<_> = suggestions
        .iter()
        .filter(|s| s.action == SuggestionAction::Ignore)
        .collect();
    assert_eq!(ignores.len(), 2);

    let p1 = ignores.iter().find(|s| s.path == "/p1/node_modules").unwrap();
    let p2 = ignores.iter().find(|s| s.path == "/p2/node_modules").unwrap();
    assert_eq!(p1.size_bytes, 300, "no cross-root leakage");
    assert_eq!(p2.size_bytes, 50);
}
