/// SQLite-backed Catalog Store.
///
/// The store is read-mostly shared data: the out-of-process scanner owns
/// record creation, and the only write this engine ever performs is the
/// two-field SHA256 update after verification. The connection sits behind a
/// `parking_lot::Mutex` so a single `Catalog` value can serve concurrent
/// stateless requests.
pub mod schema;

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{CatalogStats, ExtensionStat, FileRecord, FileSummary};

/// Column list matching [`record_from_row`]. Every query that materializes
/// full records selects exactly these, in this order.
const RECORD_COLUMNS: &str = "id, path, filename, extension, size_bytes, \
     created_at, modified_at, md5_hash, sha256_hash, sha256_verified";

/// Hard cap on search results, mirroring the original service contract.
const SEARCH_RESULT_CAP: usize = 100;

/// Optional filters for [`Catalog::search`]. All fields are ANDed together;
/// `None` means "don't filter on this".
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Substring matched against both filename and full path.
    pub query: Option<String>,
    /// Exact extension match.
    pub extension: Option<String>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
}

/// Handle to one catalog database.
pub struct Catalog {
    conn: Mutex<Connection>,
}

impl Catalog {
    /// Open a catalog database file.
    ///
    /// Applies the same performance pragmas the scanner uses, so reads stay
    /// fast while a scan is still appending in another process (WAL allows
    /// concurrent readers).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )?;
        info!("Opened catalog at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory catalog. Unit-test convenience; the schema still
    /// has to be created with [`Catalog::init_schema`].
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create the `files` table and its indexes if they don't exist.
    ///
    /// The schema is the contract shared with the out-of-process scanner;
    /// see [`schema::FILES_SCHEMA`].
    pub fn init_schema(&self) -> Result<()> {
        self.conn.lock().execute_batch(schema::FILES_SCHEMA)?;
        Ok(())
    }

    /// Total number of cataloged files.
    pub fn record_count(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .lock()
                .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// One arbitrary path from the catalog, used for separator detection.
    /// `None` means the catalog is empty.
    pub fn sample_path(&self) -> Result<Option<String>> {
        let path = self
            .conn
            .lock()
            .query_row("SELECT path FROM files LIMIT 1", [], |row| row.get(0))
            .optional()?;
        Ok(path)
    }

    /// Every record in the catalog.
    pub fn records(&self) -> Result<Vec<FileRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("SELECT {RECORD_COLUMNS} FROM files"))?;
        let rows = stmt.query_map([], record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Records whose path starts with `prefix` (SQL `LIKE` narrowing).
    ///
    /// `LIKE` treats `%` and `_` inside the prefix as wildcards, so callers
    /// that need exactness (the tree builder) re-check with `starts_with`
    /// on the returned rows.
    pub fn records_with_prefix(&self, prefix: &str) -> Result<Vec<FileRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM files WHERE path LIKE ?1 || '%'"
        ))?;
        let rows = stmt.query_map(params![prefix], record_from_row)?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("Prefix query '{prefix}' matched {} records", records.len());
        Ok(records)
    }

    /// Every path in the catalog. Used for slash-style root detection,
    /// which has to inspect variable-length first segments.
    pub fn paths(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT path FROM files")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Distinct drive-letter roots (`X:\` form) for backslash catalogs,
    /// capped at `cap` entries.
    pub fn drive_roots(&self, cap: usize) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r"SELECT DISTINCT SUBSTR(path, 1, 3) AS root_path
              FROM files
              WHERE LENGTH(path) > 2 AND SUBSTR(path, 2, 2) = ':\'
              ORDER BY root_path
              LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![cap as i64], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Overall statistics: totals, top-10 extension distribution, top-10
    /// largest files. Direct pass-through aggregation.
    pub fn stats(&self) -> Result<CatalogStats> {
        let conn = self.conn.lock();

        let (total_files, total_bytes): (i64, Option<i64>) = conn.query_row(
            "SELECT COUNT(*), SUM(size_bytes) FROM files",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = conn.prepare(
            "SELECT extension, COUNT(*) AS count, SUM(size_bytes) AS total_size
             FROM files
             GROUP BY extension
             ORDER BY total_size DESC
             LIMIT 10",
        )?;
        let extensions = stmt
            .query_map([], |row| {
                Ok(ExtensionStat {
                    extension: row.get(0)?,
                    count: row.get::<_, i64>(1)?.max(0) as u64,
                    total_bytes: row.get::<_, i64>(2)?.max(0) as u64,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            "SELECT path, filename, size_bytes
             FROM files
             ORDER BY size_bytes DESC
             LIMIT 10",
        )?;
        let largest_files = stmt
            .query_map([], |row| {
                Ok(FileSummary {
                    path: row.get(0)?,
                    filename: row.get(1)?,
                    size_bytes: row.get::<_, i64>(2)?.max(0) as u64,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(CatalogStats::new(
            total_files.max(0) as u64,
            total_bytes.unwrap_or(0).max(0) as u64,
            extensions,
            largest_files,
        ))
    }

    /// Filtered search over filename/path/extension/size, capped at
    /// [`SEARCH_RESULT_CAP`] rows.
    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<FileRecord>> {
        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM files WHERE 1=1");
        let mut args: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(query) = filter.query.as_deref().filter(|q| !q.is_empty()) {
            sql.push_str(" AND (filename LIKE ? OR path LIKE ?)");
            let pattern = format!("%{query}%");
            args.push(pattern.clone().into());
            args.push(pattern.into());
        }
        if let Some(extension) = filter.extension.as_deref() {
            sql.push_str(" AND extension = ?");
            args.push(extension.to_owned().into());
        }
        if let Some(min) = filter.min_size {
            sql.push_str(" AND size_bytes >= ?");
            args.push((min as i64).into());
        }
        if let Some(max) = filter.max_size {
            sql.push_str(" AND size_bytes <= ?");
            args.push((max as i64).into());
        }
        sql.push_str(&format!(" LIMIT {SEARCH_RESULT_CAP}"));

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Largest files first.
    pub fn largest_files(&self, limit: usize) -> Result<Vec<FileRecord>> {
        self.ordered(limit, "ORDER BY size_bytes DESC")
    }

    /// Oldest files first (by modification time).
    pub fn oldest_files(&self, limit: usize) -> Result<Vec<FileRecord>> {
        self.ordered(limit, "ORDER BY modified_at ASC")
    }

    fn ordered(&self, limit: usize, order: &str) -> Result<Vec<FileRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM files {order} LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit as i64], record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Persist a verified SHA256 for one record.
    ///
    /// Updates exactly the two SHA256 fields, keyed by immutable id.
    /// Idempotent: re-verifying an unchanged file writes the same hash.
    /// Returns `false` when no row has that id (catalog rebuilt since the
    /// candidate listing was taken).
    pub fn update_sha256(&self, id: i64, sha256: &str) -> Result<bool> {
        let affected = self.conn.lock().execute(
            "UPDATE files SET sha256_hash = ?1, sha256_verified = 1 WHERE id = ?2",
            params![sha256, id],
        )?;
        Ok(affected == 1)
    }
}

/// Map one row (in [`RECORD_COLUMNS`] order) onto a [`FileRecord`].
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        filename: row.get(2)?,
        extension: row.get(3)?,
        size_bytes: row.get::<_, i64>(4)?.max(0) as u64,
        created_at: row.get(5)?,
        modified_at: row.get(6)?,
        md5_hash: row.get(7)?,
        sha256_hash: row.get(8)?,
        sha256_verified: row.get::<_, i64>(9)? != 0,
    })
}
