//! Tesseract CLI engine
//!
//! Shells out to the `tesseract` binary once per file. Every failure mode,
//! including the binary being absent from PATH, is a recoverable per-file
//! error: the run degrades to recorded error entries instead of aborting.

use crate::error::{OcrError, OcrResult};
use crate::ocr::OcrEngine;
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// OCR engine backed by the `tesseract` command-line tool
pub struct TesseractCli {
    binary: String,
}

impl TesseractCli {
    /// Engine using `tesseract` from PATH
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
        }
    }

    /// Engine using an explicit binary path (mainly for tests)
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize_language(&self, path: &Path, language: &str) -> OcrResult<Value> {
        debug!(path = %path.display(), language = %language, "running tesseract");

        let output = Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .args(["-l", language])
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => OcrError::Launch {
                    backend: self.binary.clone(),
                    reason: "binary not found in PATH".to_string(),
                },
                _ => OcrError::Launch {
                    backend: self.binary.clone(),
                    reason: e.to_string(),
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Backend {
                path: path.to_path_buf(),
                reason: format!(
                    "exit status {}: {}",
                    output.status,
                    stderr.lines().last().unwrap_or("no diagnostic output")
                ),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let text = text.trim_end();
        let lines: Vec<&str> = text.lines().collect();

        Ok(json!({
            "text": text,
            "lines": lines,
            "lang": language,
        }))
    }
}
