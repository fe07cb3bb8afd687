//! JSON document store backend
//!
//! The whole path -> result mapping is kept in memory and written out as a
//! single pretty-printed JSON object. Each flush writes the complete image
//! to a temporary sibling file and renames it over the destination, so a
//! concurrent reader only ever sees a complete snapshot.

use crate::error::{StoreError, StoreResult};
use crate::store::ResultStore;
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result store backed by a single JSON document
pub struct JsonResultStore {
    /// Destination path (e.g. `<root>/extracted_text_index.json`)
    path: PathBuf,

    /// Full in-memory mapping; serde_json's default map keeps keys sorted,
    /// which makes repeated flushes byte-identical
    data: Map<String, Value>,

    /// Duplicate-key overwrites seen so far
    duplicates: u64,
}

impl JsonResultStore {
    /// Create a store writing to `path`
    ///
    /// Verifies the destination is writable by creating the temporary
    /// sibling file once; an unwritable destination fails here, before any
    /// processing starts.
    pub fn create(path: &Path) -> StoreResult<Self> {
        let tmp = Self::tmp_path(path);
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)
            .map_err(|e| StoreError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        // Best-effort cleanup; the probe file is recreated by every flush.
        let _ = fs::remove_file(&tmp);

        Ok(Self {
            path: path.to_path_buf(),
            data: Map::new(),
            duplicates: 0,
        })
    }

    /// Temporary sibling used for atomic replacement
    ///
    /// Lives in the same directory as the destination so the final rename
    /// never crosses a filesystem boundary.
    fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }

    /// Destination path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for JsonResultStore {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    fn add_result(&mut self, key: &str, data: Value) {
        if self.data.contains_key(key) {
            warn!(path = %key, "file path already in results index, overwriting");
            self.duplicates += 1;
        }
        self.data.insert(key.to_string(), data);
    }

    fn flush(&mut self) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.data)?;

        let tmp = Self::tmp_path(&self.path);
        fs::write(&tmp, &bytes).map_err(|e| StoreError::Flush {
            path: self.path.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Flush {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(entries = self.data.len(), path = %self.path.display(), "flushed index");
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn duplicates(&self) -> u64 {
        self.duplicates
    }
}
