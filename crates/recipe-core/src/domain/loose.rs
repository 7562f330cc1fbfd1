//! Lenient field readers.
//!
//! Catalog documents are edited by hand in the backend console, so the same
//! field shows up as a string in one document and a number or a list in the
//! next. Everything is normalized here, once, on the way in.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Split delimited text into trimmed, non-empty entries.
pub fn split_delimited(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Strings, numbers and booleans as text; anything else as empty text.
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn list(value: Value, delimiter: char) -> Vec<String> {
    match value {
        Value::String(s) => split_delimited(&s, delimiter),
        Value::Array(items) => items
            .into_iter()
            .filter_map(scalar_text)
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Comma-delimited text or a sequence.
pub(crate) fn comma_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    Ok(list(Value::deserialize(deserializer)?, ','))
}

/// Newline-delimited text or a sequence.
pub(crate) fn line_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    Ok(list(Value::deserialize(deserializer)?, '\n'))
}

/// A sequence read as a set: first occurrence wins, order kept.
pub(crate) fn string_set<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let mut set: Vec<String> = Vec::new();
    if let Value::Array(items) = Value::deserialize(deserializer)? {
        for item in items.into_iter().filter_map(scalar_text) {
            if !set.contains(&item) {
                set.push(item);
            }
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_drops_blank_entries() {
        assert_eq!(
            split_delimited(" flour, sugar ,, eggs ,", ','),
            vec!["flour", "sugar", "eggs"]
        );
    }

    #[test]
    fn test_list_accepts_both_shapes() {
        assert_eq!(list(json!("a\nb\n"), '\n'), vec!["a", "b"]);
        assert_eq!(list(json!([" a ", 2, null, ""]), '\n'), vec!["a", "2"]);
        assert!(list(json!({ "a": 1 }), ',').is_empty());
    }
}
