//! Defaulting accessors over loosely-shaped JSON input.
//!
//! Every accessor returns the empty value of its type when the key is missing or the
//! value has an unexpected shape.

use serde_json::Value;

/// String value; numbers and booleans are rendered as text.
pub fn text(map: &Value, key: &str) -> String {
    map.get(key).map(value_text).unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// List of strings from an array, or from a comma-separated string.
/// Entries are trimmed and empty ones dropped.
pub fn string_list(map: &Value, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// List of messages from an array or a single string; strings are not split.
pub fn messages(map: &Value, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

pub fn integer(map: &Value, key: &str) -> i64 {
    match map.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub fn number(map: &Value, key: &str) -> f64 {
    match map.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// The object entries of an array field; non-object entries are skipped.
pub fn entries<'a>(map: &'a Value, key: &str) -> Vec<&'a Value> {
    map.get(key)
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter(|i| i.is_object()).collect())
        .unwrap_or_default()
}

static NULL: Value = Value::Null;

/// A nested object, or `Null` when absent.
pub fn object<'a>(map: &'a Value, key: &str) -> &'a Value {
    map.get(key).filter(|v| v.is_object()).unwrap_or(&NULL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_accepts_numbers() {
        let data = json!({"year": 2020, "name": "  Jane ", "flag": true, "list": [1]});
        assert_eq!(text(&data, "year"), "2020");
        assert_eq!(text(&data, "name"), "Jane");
        assert_eq!(text(&data, "flag"), "true");
        assert_eq!(text(&data, "list"), "");
        assert_eq!(text(&data, "missing"), "");
    }

    #[test]
    fn test_string_list_shapes() {
        let data = json!({
            "csv": "Python, SQL,, ",
            "array": ["Go", "", 3],
            "other": {"a": 1}
        });
        assert_eq!(string_list(&data, "csv"), vec!["Python", "SQL"]);
        assert_eq!(string_list(&data, "array"), vec!["Go", "3"]);
        assert!(string_list(&data, "other").is_empty());
    }

    #[test]
    fn test_numbers_default_to_zero() {
        let data = json!({"years": 5, "float": 3.9, "text": "7", "bad": "seven"});
        assert_eq!(integer(&data, "years"), 5);
        assert_eq!(integer(&data, "float"), 3);
        assert_eq!(integer(&data, "text"), 7);
        assert_eq!(integer(&data, "bad"), 0);
        assert_eq!(number(&data, "float"), 3.9);
        assert_eq!(number(&Value::Null, "float"), 0.0);
    }

    #[test]
    fn test_entries_and_objects() {
        let data = json!({"experience": [{"title": "Dev"}, "junk"], "personal_info": "x"});
        assert_eq!(entries(&data, "experience").len(), 1);
        assert!(object(&data, "personal_info").is_null());
        assert_eq!(messages(&json!({"errors": "a, b"}), "errors"), vec!["a, b"]);
    }
}
