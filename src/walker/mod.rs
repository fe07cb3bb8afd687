//! Directory traversal producing candidate image files
//!
//! The walker is a lazy, single-pass iterator: one open directory handle at
//! a time plus a stack of discovered-but-unvisited subdirectories, so memory
//! stays bounded on very large trees. A fresh walker must be constructed to
//! re-enumerate.

mod files;

pub use files::{FileWalker, WalkItem};
