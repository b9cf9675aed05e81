//! Tree Builder — lazy directory hierarchy over the flat catalog.
//!
//! There is no stored tree. Each call reconstructs exactly one level from
//! the absolute paths in the catalog: a root listing (`parent == ""`) or
//! the direct children of one directory. Expansion is driven by the caller,
//! level by level, so cost stays O(rows under the parent) per request.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use compact_str::CompactString;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::paths::{self, Separator, ROOT_LIST_CAP};
use crate::store::Catalog;

/// Whether a tree entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
}

/// One child in a tree level.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    /// Name only — the full path is in `path`.
    pub name: CompactString,
    /// Full path of this entry, separator-consistent with the catalog.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Files: own size. Directories: the sum of every catalog record under
    /// the subtree. Roots: always 0 — root sizes are never aggregated so a
    /// root listing never triggers a full-table scan.
    pub size: u64,
    pub has_children: bool,
}

/// One level of the reconstructed tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeLevel {
    pub path: String,
    pub children: Vec<TreeEntry>,
}

impl TreeLevel {
    fn empty(path: &str) -> Self {
        Self {
            path: path.to_string(),
            children: Vec::new(),
        }
    }
}

/// Reconstruct one tree level.
///
/// `parent == ""` lists the catalog's roots. An empty catalog yields an
/// empty level (there is no tree to show — not an error). A parent with no
/// matching records also yields an empty level: "empty directory" and
/// "unknown path" are indistinguishable in a catalog that has no
/// authoritative notion of directory existence.
pub fn get_tree(catalog: &Catalog, parent: &str) -> Result<TreeLevel> {
    // Separator detection needs one sampled path; none means empty catalog.
    let Some(sample) = catalog.sample_path()? else {
        return Ok(TreeLevel::empty(parent));
    };
    let sep = Separator::detect(&sample);

    if parent.is_empty() {
        return list_roots(catalog, sep);
    }

    let parent_norm = paths::normalize_parent(parent, sep);
    let prefix = format!("{parent_norm}{}", sep.as_char());

    // LIKE narrows at the storage layer; the exact starts_with re-check
    // guards against `%`/`_` inside the parent acting as wildcards and
    // establishes the split_relative contract.
    let records = catalog.records_with_prefix(&prefix)?;

    let mut files: Vec<TreeEntry> = Vec::new();
    let mut dirs: BTreeMap<String, (CompactString, u64)> = BTreeMap::new();

    for record in &records {
        if !record.path.starts_with(&prefix) {
            continue;
        }
        let segments = paths::split_relative(parent_norm, &record.path, sep);
        match segments.as_slice() {
            [name] if !name.is_empty() => files.push(TreeEntry {
                name: CompactString::new(name),
                path: record.path.clone(),
                kind: EntryKind::File,
                size: record.size_bytes,
                has_children: false,
            }),
            [first, ..] if !first.is_empty() => {
                // Deeper record: its first segment names a direct
                // subdirectory. One pass sums the whole subtree, so the
                // reported size is the full recursive total.
                let dir_path = format!("{prefix}{first}");
                let entry = dirs
                    .entry(dir_path)
                    .or_insert_with(|| (CompactString::new(first), 0));
                entry.1 += record.size_bytes;
            }
            // Degenerate paths (doubled separators) fail to classify and
            // are skipped rather than producing nameless entries.
            _ => continue,
        }
    }

    let mut children: Vec<TreeEntry> = dirs
        .into_iter()
        .map(|(path, (name, size))| TreeEntry {
            name,
            path,
            kind: EntryKind::Dir,
            size,
            has_children: true,
        })
        .collect();
    children.append(&mut files);
    sort_level(&mut children);

    debug!(
        "Tree level for '{parent}': {} children from {} records",
        children.len(),
        records.len()
    );

    Ok(TreeLevel {
        path: parent.to_string(),
        children,
    })
}

/// List the catalog's roots: drive prefixes (`C:\`) for backslash catalogs,
/// first path segments for slash catalogs. Capped at [`ROOT_LIST_CAP`].
fn list_roots(catalog: &Catalog, sep: Separator) -> Result<TreeLevel> {
    let roots: Vec<(CompactString, String)> = match sep {
        Separator::Backslash => catalog
            .drive_roots(ROOT_LIST_CAP)?
            .into_iter()
            // The SUBSTR query is shape-based; drop anything that isn't a
            // real drive-letter prefix.
            .filter(|root| paths::drive_root(root).is_some())
            .map(|root| (CompactString::new(&root), root))
            .collect(),
        Separator::Slash => {
            let mut seen = BTreeSet::new();
            for path in catalog.paths()? {
                if let Some(segment) = paths::top_segment(&path) {
                    seen.insert(segment.to_string());
                    if seen.len() >= ROOT_LIST_CAP {
                        break;
                    }
                }
            }
            seen.into_iter()
                .map(|segment| {
                    let path = format!("/{segment}");
                    (CompactString::new(&segment), path)
                })
                .collect()
        }
    };

    let mut children: Vec<TreeEntry> = roots
        .into_iter()
        .map(|(name, path)| TreeEntry {
            name,
            path,
            kind: EntryKind::Dir,
            // Root listings never aggregate sizes.
            size: 0,
            has_children: true,
        })
        .collect();
    sort_level(&mut children);

    Ok(TreeLevel {
        path: String::new(),
        children,
    })
}

/// Directories before files; case-insensitive name order within each group,
/// exact name as the tiebreak so ordering is total.
fn sort_level(children: &mut [TreeEntry]) {
    children.sort_unstable_by(|a, b| {
        let a_dir = a.kind == EntryKind::Dir;
        let b_dir = b.kind == EntryKind::Dir;
        b_dir
            .cmp(&a_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}
