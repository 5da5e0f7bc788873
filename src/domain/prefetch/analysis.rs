//! Word analysis helpers for candidate generation

use unicode_segmentation::UnicodeSegmentation;

use super::entity::{RelatedWordsHint, RelationshipKind};

const TEXT_STOP_WORDS: &[&str] = &["the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for"];
const MAX_TEXT_WORDS: usize = 5;
const MIN_TEXT_WORD_LEN: usize = 4;

/// Content words pulled from free-form definition text
///
/// Keeps ASCII-alphabetic words longer than three characters that are not
/// stop words, at most five, in order of appearance.
pub fn content_words(text: &str) -> Vec<String> {
    text.unicode_words()
        .filter(|w| w.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_lowercase)
        .filter(|w| w.len() >= MIN_TEXT_WORD_LEN && !TEXT_STOP_WORDS.contains(&w.as_str()))
        .take(MAX_TEXT_WORDS)
        .collect()
}

/// Flattens a hint into normalized, deduplicated `(word, kind)` pairs
pub fn related_words(hint: &RelatedWordsHint) -> Vec<(String, RelationshipKind)> {
    let synonyms = hint
        .synonyms
        .iter()
        .map(|w| (w.trim().to_lowercase(), RelationshipKind::Synonym));
    let antonyms = hint
        .antonyms
        .iter()
        .map(|w| (w.trim().to_lowercase(), RelationshipKind::Antonym));
    let text = hint
        .definition_text
        .as_deref()
        .map(content_words)
        .unwrap_or_default()
        .into_iter()
        .map(|w| (w, RelationshipKind::Related));

    let mut out: Vec<(String, RelationshipKind)> = Vec::new();
    for (word, kind) in synonyms.chain(antonyms).chain(text) {
        if !word.is_empty() && !out.iter().any(|(w, _)| *w == word) {
            out.push((word, kind));
        }
    }
    out
}

/// Cheap inflections: plural, past and progressive forms
pub fn morphological_variants(word: &str) -> Vec<String> {
    let mut variants = Vec::with_capacity(4);

    if let Some(stem) = word.strip_suffix('y') {
        variants.push(format!("{stem}ies"));
        variants.push(format!("{stem}ied"));
    }

    if let Some(stem) = word.strip_suffix('e') {
        variants.push(format!("{word}d"));
        variants.push(format!("{stem}ing"));
    } else {
        variants.push(format!("{word}ed"));
        variants.push(format!("{word}ing"));
        variants.push(format!("{word}s"));
    }

    let mut unique: Vec<String> = Vec::with_capacity(variants.len());
    for v in variants {
        if v.chars().count() > 2 && !unique.contains(&v) {
            unique.push(v);
        }
    }
    unique
}
