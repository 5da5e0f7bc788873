//! Loads the dictionary JSON file into a [`WordIndex`]

use std::path::Path;
use std::time::Instant;

use crate::domain::dictionary::{DictionaryData, WordIndex};
use crate::domain::DomainError;

/// Reads and parses the dictionary file
///
/// A missing or malformed file is a [`DomainError::Dictionary`]; the caller
/// treats it as fatal at startup.
pub async fn load_dictionary(path: impl AsRef<Path>) -> Result<WordIndex, DomainError> {
    let path = path.as_ref();
    let started = Instant::now();

    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        DomainError::dictionary(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    let index = parse_dictionary(&contents)
        .map_err(|e| DomainError::dictionary(format!("{} ({})", e, path.display())))?;

    tracing::info!(
        path = %path.display(),
        words = index.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dictionary loaded"
    );

    Ok(index)
}

/// Parses dictionary JSON; index construction is synchronous
pub fn parse_dictionary(contents: &str) -> Result<WordIndex, DomainError> {
    let data: DictionaryData = serde_json::from_str(contents)
        .map_err(|e| DomainError::dictionary(format!("Invalid dictionary format: {}", e)))?;

    Ok(WordIndex::from_data(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "metadata": {"version": "1.2", "wordCount": 2, "lastUpdated": "2024-01-01"},
        "words": {
            "Run": {"rank": 1, "pos": "verb", "frequency": 900, "definitions": ["to move fast"]},
            "runner": {"rank": 2, "pos": "noun", "frequency": 300, "definitions": ["one who runs"]}
        }
    }"#;

    #[tokio::test]
    async fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let index = load_dictionary(file.path()).await.unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.get("run").is_some());
        assert_eq!(index.stats().metadata.unwrap().version, "1.2");
    }

    #[tokio::test]
    async fn test_missing_file_is_dictionary_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_dictionary(dir.path().join("absent.json")).await;

        assert!(matches!(result, Err(DomainError::Dictionary { .. })));
    }

    #[test]
    fn test_invalid_format_is_dictionary_error() {
        let result = parse_dictionary(r#"{"words": ["not", "a", "map"]}"#);
        assert!(matches!(result, Err(DomainError::Dictionary { .. })));
    }

    #[test]
    fn test_metadata_optional() {
        let index = parse_dictionary(r#"{"words": {}}"#).unwrap();
        assert!(index.is_empty());
    }
}
