// Submitted form input parsed from an url-encoded request body

use serde_json::{Map, Value};

use super::collaborators::RequestSource;

/// Flat map of submitted values.
///
/// Keys keep their wire form (`user[email]`); `key[]` pairs are collected
/// into an array under `key`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInput {
    values: Map<String, Value>,
}

impl FormInput {
    pub fn from_urlencoded(body: &str) -> Self {
        let mut values = Map::new();

        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            let value = Value::String(decode_component(value));

            match key.strip_suffix("[]") {
                Some(list_key) => {
                    let entry = values
                        .entry(list_key.to_string())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    match entry {
                        Value::Array(items) => items.push(value),
                        other => *other = Value::Array(vec![value]),
                    }
                }
                None => {
                    values.insert(key, value);
                }
            }
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

impl RequestSource for FormInput {
    fn all_inputs(&self) -> Map<String, Value> {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pairs() {
        let input = FormInput::from_urlencoded("name=Ada+Lovelace&email=ada%40example.com");

        assert_eq!(input.get("name"), Some(&json!("Ada Lovelace")));
        assert_eq!(input.get("email"), Some(&json!("ada@example.com")));
    }

    #[test]
    fn test_parse_keeps_bracketed_keys_flat() {
        let input = FormInput::from_urlencoded("user%5Bemail%5D=a%40b.io&user[name]=x");

        assert_eq!(input.get("user[email]"), Some(&json!("a@b.io")));
        assert_eq!(input.get("user[name]"), Some(&json!("x")));
    }

    #[test]
    fn test_parse_collects_lists() {
        let input = FormInput::from_urlencoded("tags[]=a&tags[]=b&flag");

        assert_eq!(input.get("tags"), Some(&json!(["a", "b"])));
        assert_eq!(input.get("flag"), Some(&json!("")));
    }

    #[test]
    fn test_empty_body() {
        assert!(FormInput::from_urlencoded("").values().is_empty());
    }
}
