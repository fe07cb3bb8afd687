//! OCR collaborator surface
//!
//! The indexer treats OCR as an opaque per-file call behind [`OcrEngine`].
//! Engines may block on an internal async chain; the driver only ever sees
//! the synchronous return. Accuracy, language models and image decoding all
//! live on the far side of this trait.

mod tesseract;

pub use tesseract::TesseractCli;

use crate::error::{OcrError, OcrResult};
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::warn;

/// Trait that all OCR engines must implement
pub trait OcrEngine {
    /// Engine identifier (e.g. "tesseract") for logs and error messages
    fn name(&self) -> &'static str;

    /// Extract text from `path` for a single language
    fn recognize_language(&self, path: &Path, language: &str) -> OcrResult<Value>;

    /// Extract text from `path` for the requested languages
    ///
    /// With one language this is the bare per-language result object. With
    /// several, the result is an object keyed by language code; a language
    /// that fails maps to an `{"error": ...}` marker while the others keep
    /// their results. Only when every language fails does the whole call
    /// fail, so a mixed outcome is a partial result rather than a lost file.
    fn recognize(&self, path: &Path, languages: &[String]) -> OcrResult<Value> {
        if let [language] = languages {
            return self.recognize_language(path, language);
        }

        let mut results = Map::new();
        let mut failures = 0usize;
        for language in languages {
            match self.recognize_language(path, language) {
                Ok(value) => {
                    results.insert(language.clone(), value);
                }
                Err(e) => {
                    warn!(path = %path.display(), language = %language, error = %e,
                          "language failed, recording error marker");
                    failures += 1;
                    results.insert(language.clone(), json!({ "error": e.to_string() }));
                }
            }
        }

        if !languages.is_empty() && failures == languages.len() {
            return Err(OcrError::AllLanguagesFailed {
                path: path.to_path_buf(),
                languages: failures,
            });
        }
        Ok(Value::Object(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Engine whose per-language outcome is scripted by language name
    struct ScriptedEngine;

    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn recognize_language(&self, _path: &Path, language: &str) -> OcrResult<Value> {
            if language.starts_with("bad") {
                Err(OcrError::Backend {
                    path: "/x.png".into(),
                    reason: format!("no model for {language}"),
                })
            } else {
                Ok(json!({ "text": format!("text-{language}") }))
            }
        }
    }

    #[test]
    fn test_single_language_returns_bare_result() {
        let result = ScriptedEngine
            .recognize(Path::new("/x.png"), &["eng".into()])
            .unwrap();
        assert_eq!(result["text"], "text-eng");
    }

    #[test]
    fn test_multi_language_keys_by_language() {
        let result = ScriptedEngine
            .recognize(Path::new("/x.png"), &["eng".into(), "deu".into()])
            .unwrap();
        assert_eq!(result["eng"]["text"], "text-eng");
        assert_eq!(result["deu"]["text"], "text-deu");
    }

    #[test]
    fn test_partial_failure_records_marker() {
        let result = ScriptedEngine
            .recognize(Path::new("/x.png"), &["eng".into(), "bad1".into()])
            .unwrap();
        assert_eq!(result["eng"]["text"], "text-eng");
        assert!(result["bad1"]["error"].is_string());
    }

    #[test]
    fn test_all_languages_failing_is_an_error() {
        let result =
            ScriptedEngine.recognize(Path::new("/x.png"), &["bad1".into(), "bad2".into()]);
        assert!(matches!(result, Err(OcrError::AllLanguagesFailed { .. })));
    }
}
