//! Result store backends
//!
//! A store holds the path -> OCR-result mapping for one run and flushes it
//! to durable storage. Two backends are provided:
//!
//! - [`JsonResultStore`]: one pretty-printed JSON document, replaced
//!   atomically on every flush
//! - [`SqliteResultStore`]: a SQLite row store with transactional flushes
//!
//! Backend selection happens once, at construction, through [`open_store`].
//! Construction failures (unwritable destination) are fatal and occur before
//! any traversal starts.

mod json;
mod sqlite;

pub use json::JsonResultStore;
pub use sqlite::SqliteResultStore;

use crate::config::{IndexConfig, StoreBackend};
use crate::error::StoreResult;
use serde_json::Value;

/// Capability contract shared by all result store backends
///
/// Implementations are NOT thread-safe: the driver owns the store exclusively
/// for the duration of a run. A future worker-pool caller must serialize
/// access externally (e.g. wrap the store in a `Mutex`).
pub trait ResultStore {
    /// Backend identifier for logs and the startup header
    fn backend_name(&self) -> &'static str;

    /// Insert or overwrite the entry for `key`
    ///
    /// A duplicate key is a data-loss signal, not a crash condition: the
    /// previous value is overwritten (last write wins), a warning is logged,
    /// and the duplicate counter is incremented.
    fn add_result(&mut self, key: &str, data: Value);

    /// Write the full current mapping to the backing destination
    ///
    /// A reader observing the destination after `flush` returns sees a
    /// complete, consistent snapshot; partial writes are never visible.
    /// Idempotent: flushing twice with no intervening insert produces
    /// identical output.
    fn flush(&mut self) -> StoreResult<()>;

    /// Final flush plus any backend finalization (e.g. status metadata)
    fn finish(&mut self) -> StoreResult<()> {
        self.flush()
    }

    /// Number of entries currently held
    fn len(&self) -> usize;

    /// True when no entry has been recorded yet
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of duplicate-key overwrites seen so far
    fn duplicates(&self) -> u64;
}

/// Open the store backend selected in the configuration
///
/// Fails fast when the destination cannot be written; no backend variant
/// silently no-ops.
pub fn open_store(config: &IndexConfig) -> StoreResult<Box<dyn ResultStore>> {
    match config.backend {
        StoreBackend::Json => Ok(Box::new(JsonResultStore::create(&config.output_path)?)),
        StoreBackend::Sqlite => Ok(Box::new(SqliteResultStore::create(
            &config.output_path,
            &config.root,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliArgs, StoreBackend, DEFAULT_FLUSH_INTERVAL};

    fn config(root: &std::path::Path, backend: StoreBackend) -> IndexConfig {
        IndexConfig::from_args(CliArgs {
            root: Some(root.to_path_buf()),
            command: None,
            backend,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            languages: vec![],
            exclude_patterns: vec![],
            quiet: true,
            verbose: false,
        })
        .unwrap()
    }

    #[test]
    fn test_open_json_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&config(dir.path(), StoreBackend::Json)).unwrap();
        assert_eq!(store.backend_name(), "json");
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_sqlite_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&config(dir.path(), StoreBackend::Sqlite)).unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        assert!(dir.path().join("extracted_text_index.db").exists());
    }

    #[test]
    fn test_unwritable_destination_fails_at_construction() {
        // A destination whose parent directory does not exist cannot be
        // created; this must surface before any processing.
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), StoreBackend::Json);
        config.output_path = std::path::PathBuf::from("/nonexistent-root-dir/index.json");
        assert!(open_store(&config).is_err());
    }
}
