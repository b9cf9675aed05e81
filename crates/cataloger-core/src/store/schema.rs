//! The `files` table schema — the contract shared with the scanner.
//!
//! The out-of-process scanner owns record creation and applies this exact
//! DDL; the engine re-states it so fresh databases (and test fixtures) can
//! be initialized without the scanner present. `sha256_hash` and
//! `sha256_verified` start NULL/0 and are the only columns this engine
//! ever writes.

/// DDL for the `files` table and its query indexes.
pub const FILES_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        path TEXT NOT NULL UNIQUE,
        filename TEXT NOT NULL,
        extension TEXT,
        size_bytes INTEGER NOT NULL,
        created_at INTEGER,
        modified_at INTEGER,
        md5_hash TEXT NOT NULL,
        sha256_hash TEXT,
        sha256_verified INTEGER DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_path ON files(path);
    CREATE INDEX IF NOT EXISTS idx_filename ON files(filename);
    CREATE INDEX IF NOT EXISTS idx_extension ON files(extension);
    CREATE INDEX IF NOT EXISTS idx_size ON files(size_bytes);
    CREATE INDEX IF NOT EXISTS idx_md5 ON files(md5_hash);

    CREATE INDEX IF NOT EXISTS idx_dupe_check ON files(size_bytes, md5_hash);
";
