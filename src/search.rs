//! Search front-end over a previously-built index
//!
//! Loads the whole index into memory (both backends produce modest
//! documents compared to the images they describe) and answers
//! case-insensitive substring queries over the extracted text. Matches are
//! returned in natural order so `shot2.png` sorts before `shot10.png`.

use crate::error::{Result, StoreError};
use lexical_sort::natural_lexical_cmp;
use rusqlite::Connection;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// In-memory view of an index file, keyed by image path
pub type TextIndex = Map<String, Value>;

/// Load an index produced by an indexing run
///
/// The backend is recognized by file extension: `.db` is read as a SQLite
/// index, anything else as the JSON document.
pub fn load_index(path: &Path) -> Result<TextIndex> {
    let index = match path.extension().and_then(|e| e.to_str()) {
        Some("db") => load_sqlite_index(path)?,
        _ => load_json_index(path)?,
    };
    debug!(entries = index.len(), path = %path.display(), "index loaded");
    Ok(index)
}

fn load_json_index(path: &Path) -> Result<TextIndex> {
    let raw = fs::read_to_string(path)?;
    let index = serde_json::from_str(&raw).map_err(StoreError::Serialize)?;
    Ok(index)
}

fn load_sqlite_index(path: &Path) -> Result<TextIndex> {
    let conn = Connection::open(path).map_err(StoreError::Sqlite)?;
    let mut stmt = conn
        .prepare("SELECT path, data FROM results")
        .map_err(StoreError::Sqlite)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(StoreError::Sqlite)?;

    let mut index = Map::new();
    for row in rows {
        let (key, data) = row.map_err(StoreError::Sqlite)?;
        let value = serde_json::from_str(&data).map_err(StoreError::Serialize)?;
        index.insert(key, value);
    }
    Ok(index)
}

/// Search the index for a term, returning the matching image paths
///
/// Matching is a case-insensitive substring test over all recognized text
/// of an entry (every language of a multi-language result). Results come
/// back naturally sorted instead of in map-traversal order.
pub fn find_term(index: &TextIndex, term: &str) -> Vec<String> {
    let term = term.to_lowercase();

    let mut matches: Vec<String> = index
        .iter()
        .filter(|(_, entry)| entry_text(entry).to_lowercase().contains(&term))
        .map(|(key, _)| key.clone())
        .collect();

    matches.sort_unstable_by(|a, b| natural_lexical_cmp(a, b));
    matches
}

/// Collect the recognized text of one index entry
///
/// A single-language entry carries a top-level "text" field; a
/// multi-language entry nests one such object per language. Error markers
/// have no "text" field and contribute nothing.
fn entry_text(entry: &Value) -> String {
    let Some(obj) = entry.as_object() else {
        return String::new();
    };

    if let Some(text) = obj.get("text").and_then(Value::as_str) {
        return text.to_string();
    }

    let mut combined = String::new();
    for nested in obj.values() {
        if let Some(text) = nested.get("text").and_then(Value::as_str) {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(text);
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ResultStore, SqliteResultStore};
    use serde_json::json;

    fn sample_index() -> TextIndex {
        let mut index = Map::new();
        index.insert(
            "/shots/shot10.png".into(),
            json!({ "text": "Meeting notes for Tuesday", "lang": "eng" }),
        );
        index.insert(
            "/shots/shot2.png".into(),
            json!({ "text": "meeting agenda", "lang": "eng" }),
        );
        index.insert(
            "/shots/multi.png".into(),
            json!({
                "eng": { "text": "invoice total" },
                "deu": { "text": "Rechnung" },
            }),
        );
        index.insert("/shots/broken.png".into(), json!({ "error": "unreadable" }));
        index
    }

    #[test]
    fn test_find_term_is_case_insensitive() {
        let index = sample_index();
        let matches = find_term(&index, "MEETING");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_results_are_naturally_sorted() {
        let index = sample_index();
        let matches = find_term(&index, "meeting");
        assert_eq!(
            matches,
            vec![
                "/shots/shot2.png".to_string(),
                "/shots/shot10.png".to_string()
            ]
        );
    }

    #[test]
    fn test_multi_language_entries_are_searched() {
        let index = sample_index();
        assert_eq!(find_term(&index, "rechnung").len(), 1);
        assert_eq!(find_term(&index, "invoice").len(), 1);
    }

    #[test]
    fn test_error_entries_never_match() {
        let index = sample_index();
        assert!(find_term(&index, "unreadable").is_empty());
    }

    #[test]
    fn test_no_match_returns_empty() {
        let index = sample_index();
        assert!(find_term(&index, "zebra").is_empty());
    }

    #[test]
    fn test_load_json_index_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extracted_text_index.json");
        fs::write(
            &path,
            serde_json::to_vec_pretty(&Value::Object(sample_index())).unwrap(),
        )
        .unwrap();

        let index = load_index(&path).unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(find_term(&index, "agenda"), vec!["/shots/shot2.png"]);
    }

    #[test]
    fn test_load_sqlite_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extracted_text_index.db");
        {
            let mut store = SqliteResultStore::create(&path, dir.path()).unwrap();
            store.add_result("/a.png", json!({ "text": "hello world" }));
            store.finish().unwrap();
        }

        let index = load_index(&path).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(find_term(&index, "Hello"), vec!["/a.png"]);
    }

    #[test]
    fn test_missing_index_file_is_an_error() {
        assert!(load_index(Path::new("/no/such/index.json")).is_err());
    }
}
