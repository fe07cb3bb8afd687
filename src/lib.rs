//! ocr-indexer - Recursive Image Text Extraction Indexer
//!
//! A tool that walks a folder tree, runs OCR on every supported image file
//! and persists the per-file results into a single index, flushed to disk
//! periodically so an interrupted run loses at most one batch of work.
//!
//! # Features
//!
//! - **Lazy traversal**: One open directory handle at a time; memory stays
//!   bounded on very large trees.
//!
//! - **Pluggable result stores**: A pretty-printed JSON document (replaced
//!   atomically on each flush) or a SQLite row store with transactional
//!   flushes. Selected at startup; misconfiguration fails before any work.
//!
//! - **Per-file failure tolerance**: A vanished file, an unreadable image or
//!   a failing OCR backend produces a recorded error entry for that path and
//!   the run continues.
//!
//! - **Crash resilience**: The store is flushed every N processed files
//!   (default 500) and once more on completion or interrupt.
//!
//! - **Search**: A `search` subcommand answers case-insensitive substring
//!   queries over a previously-built index, with naturally-sorted results.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   WalkItem   ┌──────────────────┐
//! │  FileWalker  │─────────────▶│ ProcessingDriver │
//! │ (lazy, pre-  │              │  (sequential)    │
//! │  order walk) │              └────────┬─────────┘
//! └──────────────┘                       │ recognize(path, langs)
//!                                        ▼
//!                               ┌──────────────────┐
//!                               │    OcrEngine     │
//!                               │ (tesseract CLI)  │
//!                               └────────┬─────────┘
//!                                        │ result / error entry
//!                                        ▼
//!                               ┌──────────────────┐
//!                               │   ResultStore    │
//!                               │  (JSON | SQLite) │
//!                               └────────┬─────────┘
//!                                        │ periodic + final flush
//!                                        ▼
//!                            <root>/extracted_text_index.*
//! ```
//!
//! # Example
//!
//! ```bash
//! # Index a screenshot folder into extracted_text_index.json
//! ocr-indexer ~/Pictures/screenshots
//!
//! # SQLite output, two languages, skip thumbnail caches
//! ocr-indexer /data/scans --backend sqlite -l eng -l deu --exclude '\.thumbnails'
//!
//! # Find every indexed image mentioning a term
//! ocr-indexer search ~/Pictures/screenshots/extracted_text_index.json invoice
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod ocr;
pub mod progress;
pub mod search;
pub mod store;
pub mod walker;
