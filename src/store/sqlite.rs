//! SQLite row-store backend
//!
//! Stores one row per processed file with the OCR result serialized as a
//! JSON text column. Entries are buffered in memory and written inside a
//! single transaction per flush, so readers of the database always see a
//! complete snapshot.

use crate::error::{StoreError, StoreResult};
use crate::store::ResultStore;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Current schema version for migrations
pub const SCHEMA_VERSION: u32 = 1;

/// SQL to create the results table
const CREATE_RESULTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS results (
    path TEXT PRIMARY KEY,
    data TEXT NOT NULL             -- OCR result as a JSON document
)
"#;

/// SQL to create the run metadata table
const CREATE_INDEX_INFO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS index_info (
    key TEXT PRIMARY KEY,
    value TEXT
)
"#;

/// SQLite pragmas for write performance during a run
const WRITE_PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA temp_store = MEMORY;
"#;

/// Well-known metadata keys
pub mod keys {
    pub const SCHEMA_VERSION: &str = "schema_version";
    pub const TOOL_VERSION: &str = "tool_version";
    pub const ROOT_PATH: &str = "root_path";
    pub const STATUS: &str = "status";
}

/// Set a metadata key in the index_info table
pub fn set_index_info(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO index_info (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

/// Get a metadata value from the index_info table
pub fn get_index_info(conn: &Connection, key: &str) -> StoreResult<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM index_info WHERE key = ?1")?;
    let mut rows = stmt.query(params![key])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

/// Result store backed by a SQLite database
pub struct SqliteResultStore {
    conn: Connection,
    path: PathBuf,

    /// Full in-memory mapping for the run (sorted for deterministic flushes)
    data: BTreeMap<String, Value>,

    /// Keys inserted or overwritten since the last flush
    dirty: Vec<String>,

    /// Duplicate-key overwrites seen so far
    duplicates: u64,
}

impl SqliteResultStore {
    /// Create or open the database at `path` and prepare the schema
    pub fn create(path: &Path, root: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        conn.execute_batch(WRITE_PRAGMAS)?;
        conn.execute(CREATE_RESULTS_TABLE, [])?;
        conn.execute(CREATE_INDEX_INFO_TABLE, [])?;

        // A fresh run replaces the index wholesale, like the JSON backend:
        // rows from an earlier run must not outlive files deleted since then
        conn.execute("DELETE FROM results", [])?;

        set_index_info(&conn, keys::SCHEMA_VERSION, &SCHEMA_VERSION.to_string())?;
        set_index_info(&conn, keys::TOOL_VERSION, env!("CARGO_PKG_VERSION"))?;
        set_index_info(&conn, keys::ROOT_PATH, &root.display().to_string())?;
        set_index_info(&conn, keys::STATUS, "running")?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            data: BTreeMap::new(),
            dirty: Vec::new(),
            duplicates: 0,
        })
    }

    /// Database path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for SqliteResultStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn add_result(&mut self, key: &str, data: Value) {
        if self.data.contains_key(key) {
            warn!(path = %key, "file path already in results index, overwriting");
            self.duplicates += 1;
        }
        self.data.insert(key.to_string(), data);
        self.dirty.push(key.to_string());
    }

    fn flush(&mut self) -> StoreResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT OR REPLACE INTO results (path, data) VALUES (?1, ?2)")?;
            for key in &self.dirty {
                // dirty keys always have a backing entry
                if let Some(value) = self.data.get(key) {
                    stmt.execute(params![key, serde_json::to_string(value)?])?;
                }
            }
        }
        tx.commit()?;

        debug!(
            entries = self.data.len(),
            written = self.dirty.len(),
            path = %self.path.display(),
            "flushed index"
        );
        self.dirty.clear();
        Ok(())
    }

    fn finish(&mut self) -> StoreResult<()> {
        self.flush()?;
        set_index_info(&self.conn, keys::STATUS, "completed")?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn duplicates(&self) -> u64 {
        self.duplicates
    }
}
