//! Configuration types for ocr-indexer
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - The supported-extension allow-list and flush interval defaults

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use regex::Regex;
use std::path::{Path, PathBuf};

/// How many processed files between periodic store flushes
pub const DEFAULT_FLUSH_INTERVAL: usize = 500;

/// File extensions handed to the OCR engine (matched case-insensitively)
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "webp", "bmp"];

/// Stem of the backing file written into the root folder
pub const INDEX_FILE_STEM: &str = "extracted_text_index";

/// Default OCR language when none is given
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Recursive image text extraction indexer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ocr-indexer",
    version,
    about = "Extract text from a tree of images into a result index",
    long_about = "Walks a folder tree, runs OCR on every supported image file, and \
                  writes the per-file results into a single index document.\n\n\
                  Results are flushed to disk periodically so an interrupted run \
                  keeps everything processed up to the last flush.",
    after_help = "EXAMPLES:\n    \
        ocr-indexer ~/Pictures/screenshots\n    \
        ocr-indexer /data/scans --backend sqlite -v\n    \
        ocr-indexer . -l eng -l deu --exclude '\\.thumbnails'\n    \
        ocr-indexer search ~/Pictures/screenshots/extracted_text_index.json invoice",
    args_conflicts_with_subcommands = true
)]
pub struct CliArgs {
    /// Root folder to index (defaults to the current directory)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Subcommand (search, etc.)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Result store backend
    #[arg(long, value_enum, default_value = "json")]
    pub backend: StoreBackend,

    /// Number of processed files between periodic flushes
    #[arg(long, default_value_t = DEFAULT_FLUSH_INTERVAL, value_name = "NUM")]
    pub flush_interval: usize,

    /// OCR language (can be repeated for multi-language results)
    #[arg(short = 'l', long = "lang", value_name = "LANG", action = clap::ArgAction::Append)]
    pub languages: Vec<String>,

    /// Exclude paths matching pattern (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Quiet mode - suppress per-folder notices and progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (show skipped files and per-file timings)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Subcommands
#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Search a previously-built index for a term
    Search {
        /// Index file produced by an indexing run (.json or .db)
        #[arg(value_name = "INDEX")]
        index: PathBuf,

        /// Term to look for (case-insensitive substring match)
        #[arg(value_name = "TERM")]
        term: String,
    },
}

/// Result store backend selection
///
/// Unknown names are rejected by clap at parse time, so a backend value that
/// reaches `open_store` is always one of these implemented variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Single pretty-printed JSON document (extracted_text_index.json)
    Json,
    /// SQLite row store (extracted_text_index.db)
    Sqlite,
}

impl StoreBackend {
    /// Backing file extension for this backend
    pub fn file_extension(&self) -> &'static str {
        match self {
            StoreBackend::Json => "json",
            StoreBackend::Sqlite => "db",
        }
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Root folder being indexed
    pub root: PathBuf,

    /// Backing file path (inside the root folder)
    pub output_path: PathBuf,

    /// Selected store backend
    pub backend: StoreBackend,

    /// Files between periodic flushes
    pub flush_interval: usize,

    /// OCR languages, in request order
    pub languages: Vec<String>,

    /// Lowercased extension allow-list (without leading dot)
    pub extensions: Vec<String>,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// Suppress per-folder notices and progress display
    pub quiet: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl IndexConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let root = args.root.unwrap_or_else(|| PathBuf::from("."));

        if !root.exists() {
            return Err(ConfigError::RootNotFound { path: root });
        }
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory { path: root });
        }

        if args.flush_interval == 0 {
            return Err(ConfigError::InvalidFlushInterval {
                interval: args.flush_interval,
            });
        }

        let languages = if args.languages.is_empty() {
            vec![DEFAULT_LANGUAGE.to_string()]
        } else {
            args.languages
        };
        if languages.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::NoLanguages);
        }

        let exclude_patterns = args
            .exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output_path = root.join(format!(
            "{}.{}",
            INDEX_FILE_STEM,
            args.backend.file_extension()
        ));

        Ok(Self {
            root,
            output_path,
            backend: args.backend,
            flush_interval: args.flush_interval,
            languages,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude_patterns,
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }

    /// Check if a file has an extension on the allow-list (case-insensitive)
    pub fn is_supported(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }

    /// Check if a path matches any exclude pattern
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_patterns.iter().any(|re| re.is_match(path))
    }
}
