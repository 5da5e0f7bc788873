//! Dictionary data entities

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single word's definition record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDefinition {
    pub rank: u32,
    pub pos: String,
    pub frequency: u64,
    pub definitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub antonyms: Vec<String>,
}

impl WordDefinition {
    pub fn new(rank: u32, pos: impl Into<String>, frequency: u64) -> Self {
        Self {
            rank,
            pos: pos.into(),
            frequency,
            definitions: Vec::new(),
            pronunciation: None,
            examples: Vec::new(),
            synonyms: Vec::new(),
            antonyms: Vec::new(),
        }
    }

    pub fn with_definition(mut self, text: impl Into<String>) -> Self {
        self.definitions.push(text.into());
        self
    }

    pub fn with_synonyms<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn with_antonyms<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.antonyms.extend(words.into_iter().map(Into::into));
        self
    }

    /// All definition texts joined for cross-reference extraction
    pub fn definition_text(&self) -> String {
        self.definitions.join(" ")
    }
}

/// Dictionary file metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryMetadata {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub last_updated: String,
}

/// Dictionary file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryData {
    #[serde(default)]
    pub metadata: DictionaryMetadata,
    pub words: HashMap<String, WordDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_definition() {
        let json = r#"{"rank": 12, "pos": "verb", "frequency": 900, "definitions": ["to move fast"]}"#;
        let def: WordDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(def.rank, 12);
        assert!(def.synonyms.is_empty());
        assert!(def.pronunciation.is_none());
    }

    #[test]
    fn test_definition_text_joins() {
        let def = WordDefinition::new(1, "noun", 10)
            .with_definition("first meaning")
            .with_definition("second meaning");

        assert_eq!(def.definition_text(), "first meaning second meaning");
    }

    #[test]
    fn test_deserialize_dictionary_file() {
        let json = r#"{
            "metadata": {"version": "1.0", "wordCount": 1, "lastUpdated": "2025-01-09"},
            "words": {"run": {"rank": 1, "pos": "verb", "frequency": 10, "definitions": []}}
        }"#;
        let data: DictionaryData = serde_json::from_str(json).unwrap();

        assert_eq!(data.metadata.word_count, 1);
        assert!(data.words.contains_key("run"));
    }
}
