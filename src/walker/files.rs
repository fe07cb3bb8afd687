//! Lazy pre-order file walker
//!
//! Yields one [`WalkItem`] per file whose extension is on the configured
//! allow-list. Directories that vanish or become unreadable mid-walk are
//! logged and skipped; they never abort the traversal.

use crate::config::IndexConfig;
use std::fs::{self, ReadDir};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// One candidate file produced by the walker
///
/// Ephemeral: produced and consumed within a single driver iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkItem {
    /// Folder containing the file
    pub folder: PathBuf,

    /// File name within the folder
    pub file_name: String,

    /// Full path (folder + file name)
    pub path: PathBuf,
}

/// Lazy pre-order traversal of an image tree
///
/// Files of a folder are yielded before any file of its subfolders; sibling
/// order is filesystem-dependent and not guaranteed.
pub struct FileWalker<'a> {
    config: &'a IndexConfig,

    /// Subdirectories discovered but not yet opened
    pending: Vec<PathBuf>,

    /// The directory currently being read
    current: Option<(PathBuf, ReadDir)>,
}

impl<'a> FileWalker<'a> {
    /// Start a traversal at the configured root
    pub fn new(config: &'a IndexConfig) -> Self {
        Self {
            config,
            pending: vec![config.root.clone()],
            current: None,
        }
    }

    /// Open the next pending directory, skipping unreadable ones
    fn open_next_dir(&mut self) -> bool {
        while let Some(dir) = self.pending.pop() {
            match fs::read_dir(&dir) {
                Ok(rd) => {
                    if !self.config.quiet {
                        info!(folder = %dir.display(), "checking folder");
                    }
                    self.current = Some((dir, rd));
                    return true;
                }
                Err(e) => {
                    warn!(folder = %dir.display(), error = %e, "skipping unreadable folder");
                }
            }
        }
        false
    }
}

impl Iterator for FileWalker<'_> {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        loop {
            if self.current.is_none() && !self.open_next_dir() {
                return None;
            }

            let (folder, rd) = self.current.as_mut().unwrap();
            let entry = match rd.next() {
                None => {
                    self.current = None;
                    continue;
                }
                Some(Err(e)) => {
                    warn!(folder = %folder.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
                Some(Ok(entry)) => entry,
            };

            let path = entry.path();
            if self.config.is_excluded(&path.to_string_lossy()) {
                debug!(path = %path.display(), "excluded by pattern");
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot determine file type, skipping");
                    continue;
                }
            };

            if file_type.is_dir() {
                self.pending.push(path);
                continue;
            }

            if !self.config.is_supported(&path) {
                debug!(path = %path.display(), "skipping unsupported file");
                continue;
            }

            let folder = folder.clone();
            let file_name = entry.file_name().to_string_lossy().into_owned();
            return Some(WalkItem {
                folder,
                file_name,
                path,
            });
        }
    }
}
