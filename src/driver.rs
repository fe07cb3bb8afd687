//! Processing driver - orchestrates the walk -> OCR -> store loop
//!
//! The driver is strictly sequential: one file is fully recognized and
//! recorded before the next begins. It owns the store exclusively for the
//! run, performs the periodic and final flushes, and downgrades every
//! per-file failure to a recorded error entry.

use crate::config::IndexConfig;
use crate::error::{OcrError, Result};
use crate::ocr::OcrEngine;
use crate::progress::ProgressReporter;
use crate::store::ResultStore;
use crate::walker::FileWalker;
use serde_json::{json, Value};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Result of a completed indexing run
#[derive(Debug)]
pub struct RunStats {
    /// Files handed to the OCR engine (successes and failures)
    pub processed: u64,

    /// Files recorded with an error entry instead of a result
    pub failed: u64,

    /// Duplicate-key overwrites reported by the store
    pub duplicates: u64,

    /// Bytes of image data examined
    pub bytes: u64,

    /// Number of store flushes performed (periodic + final)
    pub flushes: u64,

    /// Wall-clock time for the run
    pub duration: Duration,

    /// Whether the run finished (vs was interrupted)
    pub completed: bool,
}

/// Sequential indexing driver
pub struct ProcessingDriver<'a> {
    config: &'a IndexConfig,
    store: Box<dyn ResultStore>,
    engine: Box<dyn OcrEngine>,
    shutdown: Arc<AtomicBool>,
}

impl<'a> ProcessingDriver<'a> {
    /// Create a driver owning `store` and `engine` for one run
    pub fn new(
        config: &'a IndexConfig,
        store: Box<dyn ResultStore>,
        engine: Box<dyn OcrEngine>,
    ) -> Self {
        Self {
            config,
            store,
            engine,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked once per file; set it (e.g. from a signal handler) to
    /// stop the run after the current file with a best-effort flush
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Walk the tree, recognize every candidate file and persist the results
    ///
    /// Per-file failures are recorded and skipped; only flush failures that
    /// survive a retry (and final-flush failures) abort the run.
    pub fn run(&mut self, progress: Option<&ProgressReporter>) -> Result<RunStats> {
        let start = Instant::now();
        let mut processed: u64 = 0;
        let mut failed: u64 = 0;
        let mut bytes: u64 = 0;
        let mut flushes: u64 = 0;
        let mut interrupted = false;

        for item in FileWalker::new(self.config) {
            if self.shutdown.load(Ordering::SeqCst) {
                interrupted = true;
                break;
            }

            if processed > 0 && processed % self.config.flush_interval as u64 == 0 {
                self.flush_with_retry()?;
                flushes += 1;
                info!(
                    processed,
                    elapsed_secs = start.elapsed().as_secs_f64(),
                    "progress checkpoint"
                );
            }

            if let Some(p) = progress {
                p.update(processed, failed, bytes, start.elapsed());
            }

            let key = item.path.to_string_lossy().into_owned();
            match fs::metadata(&item.path) {
                Ok(meta) => {
                    bytes += meta.len();
                    match self.engine.recognize(&item.path, &self.config.languages) {
                        Ok(result) => self.store.add_result(&key, result),
                        Err(e) => {
                            warn!(path = %key, error = %e, "OCR failed, recording error entry");
                            self.store.add_result(&key, error_entry(&e));
                            failed += 1;
                        }
                    }
                }
                Err(e) => {
                    // Enumerated but gone (or unreadable) by processing time
                    let e = OcrError::FileAccess {
                        path: item.path.clone(),
                        reason: e.to_string(),
                    };
                    warn!(path = %key, error = %e, "file vanished, recording error entry");
                    self.store.add_result(&key, error_entry(&e));
                    failed += 1;
                }
            }
            processed += 1;
        }

        // Final flush: unconditional on a normal finish, best-effort after
        // an interrupt so everything processed so far survives
        if interrupted {
            warn!("run interrupted, flushing partial results");
            if let Err(e) = self.store.flush() {
                error!(error = %e, "best-effort flush after interrupt failed");
            } else {
                flushes += 1;
            }
        } else {
            self.store.finish()?;
            flushes += 1;
        }

        let stats = RunStats {
            processed,
            failed,
            duplicates: self.store.duplicates(),
            bytes,
            flushes,
            duration: start.elapsed(),
            completed: !interrupted,
        };
        info!(
            processed = stats.processed,
            failed = stats.failed,
            elapsed_secs = stats.duration.as_secs_f64(),
            "run finished"
        );
        Ok(stats)
    }

    /// Flush the store, retrying once before giving up
    ///
    /// A lost periodic flush risks everything since the last successful one,
    /// so a repeated failure is fatal rather than silently ignored.
    fn flush_with_retry(&mut self) -> Result<()> {
        if let Err(first) = self.store.flush() {
            warn!(error = %first, "periodic flush failed, retrying");
            self.store.flush().map_err(|e| {
                error!(error = %e, "flush retry failed, aborting run");
                e
            })?;
        }
        Ok(())
    }
}

/// Error marker recorded in place of a result for a failed file
fn error_entry(e: &OcrError) -> Value {
    json!({ "error": e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliArgs, StoreBackend};
    use crate::error::{IndexerError, OcrResult, StoreError, StoreResult};
    use crate::store::JsonResultStore;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use std::rc::Rc;

    /// Engine that succeeds unless the file is unreadable
    struct EchoEngine;

    impl OcrEngine for EchoEngine {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn recognize_language(&self, path: &Path, language: &str) -> OcrResult<Value> {
            let text = fs::read_to_string(path).map_err(|e| OcrError::FileAccess {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            Ok(json!({ "text": text.trim(), "lang": language }))
        }
    }

    /// Store whose first `failures_left` flushes fail with an I/O error
    struct FlakyStore {
        data: BTreeMap<String, Value>,
        failures_left: usize,
        successful_flushes: Rc<RefCell<u64>>,
    }

    impl FlakyStore {
        fn new(failures_left: usize) -> (Self, Rc<RefCell<u64>>) {
            let successful_flushes = Rc::new(RefCell::new(0));
            let store = Self {
                data: BTreeMap::new(),
                failures_left,
                successful_flushes: Rc::clone(&successful_flushes),
            };
            (store, successful_flushes)
        }
    }

    impl ResultStore for FlakyStore {
        fn backend_name(&self) -> &'static str {
            "flaky"
        }

        fn add_result(&mut self, key: &str, data: Value) {
            self.data.insert(key.to_string(), data);
        }

        fn flush(&mut self) -> StoreResult<()> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(StoreError::Flush {
                    path: "/flaky-index.json".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            *self.successful_flushes.borrow_mut() += 1;
            Ok(())
        }

        fn len(&self) -> usize {
            self.data.len()
        }

        fn duplicates(&self) -> u64 {
            0
        }
    }

    fn config_for(root: &Path, flush_interval: usize) -> IndexConfig {
        IndexConfig::from_args(CliArgs {
            root: Some(root.to_path_buf()),
            command: None,
            backend: StoreBackend::Json,
            flush_interval,
            languages: vec![],
            exclude_patterns: vec![],
            quiet: true,
            verbose: false,
        })
        .unwrap()
    }

    fn write_file(path: &Path, content: &str) {
        let mut f = File::create(path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_run_indexes_supported_files_only() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a.png"), "alpha");
        write_file(&dir.path().join("b.png"), "beta");
        write_file(&dir.path().join("notes.txt"), "not an image");

        let config = config_for(dir.path(), 500);
        let store = JsonResultStore::create(&config.output_path).unwrap();
        let mut driver = ProcessingDriver::new(&config, Box::new(store), Box::new(EchoEngine));

        let stats = driver.run(None).unwrap();
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.failed, 0);
        assert!(stats.completed);

        let parsed: Value =
            serde_json::from_str(&fs::read_to_string(&config.output_path).unwrap()).unwrap();
        let obj = parsed.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.keys().all(|k| k.ends_with(".png")));
    }

    #[test]
    fn test_engine_failure_records_error_entry() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("ok.png"), "fine");
        // Invalid UTF-8 makes the echo engine fail for this file
        File::create(dir.path().join("broken.png"))
            .unwrap()
            .write_all(&[0xFF, 0xFE, 0x00])
            .unwrap();

        let config = config_for(dir.path(), 500);
        let store = JsonResultStore::create(&config.output_path).unwrap();
        let mut driver = ProcessingDriver::new(&config, Box::new(store), Box::new(EchoEngine));

        let stats = driver.run(None).unwrap();
        assert_eq!(stats.failed, 1);

        let parsed: Value =
            serde_json::from_str(&fs::read_to_string(&config.output_path).unwrap()).unwrap();
        let broken_key = dir.path().join("broken.png");
        assert!(parsed[broken_key.to_string_lossy().as_ref()]["error"].is_string());
    }

    #[test]
    fn test_preset_shutdown_flag_flushes_and_reports_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a.png"), "alpha");

        let config = config_for(dir.path(), 500);
        let store = JsonResultStore::create(&config.output_path).unwrap();
        let mut driver = ProcessingDriver::new(&config, Box::new(store), Box::new(EchoEngine));
        driver.shutdown_flag().store(true, Ordering::SeqCst);

        let stats = driver.run(None).unwrap();
        assert!(!stats.completed);
        assert_eq!(stats.processed, 0);
        // Best-effort flush still ran: the index exists and is valid JSON
        let parsed: Value =
            serde_json::from_str(&fs::read_to_string(&config.output_path).unwrap()).unwrap();
        assert_eq!(parsed, json!({}));
    }

    #[test]
    fn test_empty_tree_produces_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), 500);
        let store = JsonResultStore::create(&config.output_path).unwrap();
        let mut driver = ProcessingDriver::new(&config, Box::new(store), Box::new(EchoEngine));

        let stats = driver.run(None).unwrap();
        assert_eq!(stats.processed, 0);
        assert!(stats.completed);

        let parsed: Value =
            serde_json::from_str(&fs::read_to_string(&config.output_path).unwrap()).unwrap();
        assert_eq!(parsed, json!({}));
    }

    #[test]
    fn test_walk_item_counted_even_when_failed() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("broken.png"))
            .unwrap()
            .write_all(&[0xFF, 0xFE, 0x00])
            .unwrap();

        let config = config_for(dir.path(), 500);
        let store = JsonResultStore::create(&config.output_path).unwrap();
        let mut driver = ProcessingDriver::new(&config, Box::new(store), Box::new(EchoEngine));

        let stats = driver.run(None).unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_periodic_flush_failure_recovers_on_retry() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a.png"), "alpha");
        write_file(&dir.path().join("b.png"), "beta");

        // flush_interval of 1 forces a periodic flush before the second file
        let config = config_for(dir.path(), 1);
        let (store, flushes) = FlakyStore::new(1);
        let mut driver = ProcessingDriver::new(&config, Box::new(store), Box::new(EchoEngine));

        let stats = driver.run(None).unwrap();
        assert_eq!(stats.processed, 2);
        assert!(stats.completed);
        // Periodic flush succeeded on retry, then the final flush ran
        assert_eq!(*flushes.borrow(), 2);
    }

    #[test]
    fn test_periodic_flush_failing_twice_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a.png"), "alpha");
        write_file(&dir.path().join("b.png"), "beta");

        let config = config_for(dir.path(), 1);
        let (store, flushes) = FlakyStore::new(2);
        let mut driver = ProcessingDriver::new(&config, Box::new(store), Box::new(EchoEngine));

        let err = driver.run(None).unwrap_err();
        assert!(matches!(err, IndexerError::Store(StoreError::Flush { .. })));
        assert_eq!(*flushes.borrow(), 0);
    }

    #[test]
    fn test_final_flush_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a.png"), "alpha");

        // Interval far above the file count: only the final flush runs
        let config = config_for(dir.path(), 500);
        let (store, flushes) = FlakyStore::new(1);
        let mut driver = ProcessingDriver::new(&config, Box::new(store), Box::new(EchoEngine));

        let err = driver.run(None).unwrap_err();
        assert!(matches!(err, IndexerError::Store(StoreError::Flush { .. })));
        assert_eq!(*flushes.borrow(), 0);
    }
}
