//! Cache key generation

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::DomainError;

/// Namespace for word definition entries
pub const WORD_NAMESPACE: &str = "word";

/// Key for a single word's cached definition
pub fn word_key(word: &str) -> String {
    format!("{}:{}", WORD_NAMESPACE, word.trim().to_lowercase())
}

/// Serializes a value to JSON with object keys sorted at every depth
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, DomainError> {
    let value = serde_json::to_value(value)
        .map_err(|e| DomainError::cache(format!("Failed to serialize key material: {}", e)))?;

    let mut out = String::new();
    write_canonical(&value, &mut out);
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Stable hash of composite key material
///
/// Semantically identical inputs (same fields, any field order) map to the
/// same hex digest.
pub fn hash_key<T: Serialize + ?Sized>(value: &T) -> Result<String, DomainError> {
    let canonical = canonical_json(value)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(hex::encode(digest))
}
