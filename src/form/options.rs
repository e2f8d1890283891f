// Option bag helpers
//
// Options are plain JSON maps so fields and forms can carry arbitrary
// values (labels, rules, html attributes, choices) without a fixed schema.

use serde_json::{Map, Value};

/// Option bag attached to a field or a form
pub type Options = Map<String, Value>;

/// Build an option bag from a `json!({...})` literal or any JSON value.
///
/// Non-object values produce an empty bag.
pub fn options(value: Value) -> Options {
    match value {
        Value::Object(map) => map,
        _ => Options::new(),
    }
}

/// Recursively merge `overrides` on top of `base`, returning a new map.
///
/// Nested objects are merged key by key; any other value in `overrides`
/// replaces the one in `base`.
pub fn merge_options(base: &Options, overrides: &Options) -> Options {
    let mut merged = base.clone();

    for (key, value) in overrides {
        match (merged.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                let nested = merge_options(existing, incoming);
                *existing = nested;
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    merged
}

/// Remove an option and return it, treating explicit nulls as absent
pub fn pull_option(options: &mut Options, key: &str) -> Option<Value> {
    match options.remove(key) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    }
}

/// Read an option as a string slice
pub fn option_str<'a>(options: &'a Options, key: &str) -> Option<&'a str> {
    options.get(key).and_then(Value::as_str)
}

/// Read an option as a bool, accepting the truthy forms posted by html forms
pub fn option_bool(options: &Options, key: &str) -> Option<bool> {
    options.get(key).map(is_truthy)
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0" && s != "false",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Render a scalar option value as text; arrays and objects yield `None`
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1".to_string() } else { "0".to_string() }),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_options_is_recursive() {
        let base = options(json!({"label": "Name", "attr": {"class": "a", "id": "x"}}));
        let overrides = options(json!({"attr": {"class": "b"}, "rules": "required"}));

        let merged = merge_options(&base, &overrides);

        assert_eq!(
            Value::Object(merged),
            json!({"label": "Name", "attr": {"class": "b", "id": "x"}, "rules": "required"})
        );
        // base is untouched
        assert_eq!(base["attr"]["class"], json!("a"));
    }

    #[test]
    fn test_pull_option_ignores_null() {
        let mut opts = options(json!({"model": null, "name": "user"}));

        assert_eq!(pull_option(&mut opts, "model"), None);
        assert_eq!(pull_option(&mut opts, "name"), Some(json!("user")));
        assert!(opts.is_empty());
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(null)));
    }
}
