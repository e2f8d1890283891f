// Name namespacing for named and nested forms

use serde_json::{Map, Value};

/// Compute the wire name of a field.
///
/// A field of a named form is contained in a single key: `user[email]`.
pub fn qualify(raw_name: &str, form_name: Option<&str>) -> String {
    match form_name {
        Some(form_name) => format!("{}[{}]", form_name, raw_name),
        None => raw_name.to_string(),
    }
}

/// Wrap a bound model under the form name so values bind to `name[field]`.
///
/// Re-wrapping a model that already carries the form name at the top level
/// is a no-op, as is wrapping an empty model.
pub fn wrap_model(model: Value, form_name: &str) -> Value {
    if is_empty_model(&model) {
        return model;
    }

    if let Value::Object(map) = &model {
        if map.contains_key(form_name) {
            return model;
        }
    }

    let mut wrapped = Map::new();
    wrapped.insert(form_name.to_string(), model);
    Value::Object(wrapped)
}

/// Null, empty objects and empty arrays count as "no model bound"
pub fn is_empty_model(model: &Value) -> bool {
    match model {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Split a qualified name into its path segments.
///
/// `user[address][city]` becomes `["user", "address", "city"]`. Names
/// without brackets yield a single segment.
pub fn name_segments(qualified: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let (head, mut rest) = match qualified.find('[') {
        Some(pos) => (&qualified[..pos], &qualified[pos..]),
        None => return vec![qualified],
    };
    segments.push(head);

    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(end) => {
                segments.push(&stripped[..end]);
                rest = &stripped[end + 1..];
            }
            None => {
                // Unterminated bracket, keep the remainder verbatim
                segments.push(stripped);
                break;
            }
        }
    }

    segments
}

/// Move a qualified name from one enclosing form name to another.
///
/// `user[address][street]` moved from `user` to `acct` becomes
/// `acct[address][street]`. Returns `None` when the name does not sit
/// under `previous`.
pub fn requalify(qualified: &str, previous: Option<&str>, current: Option<&str>) -> Option<String> {
    let segments = name_segments(qualified);
    let rest = match previous {
        Some(previous) => {
            let prefix = name_segments(previous);
            if segments.len() <= prefix.len() || segments[..prefix.len()] != prefix[..] {
                return None;
            }
            &segments[prefix.len()..]
        }
        None => &segments[..],
    };

    let (first, tail) = rest.split_first()?;
    let mut requalified = match current {
        Some(current) => format!("{}[{}]", current, first),
        None => first.to_string(),
    };
    for segment in tail {
        requalified.push('[');
        requalified.push_str(segment);
        requalified.push(']');
    }
    Some(requalified)
}

/// Look up a value by qualified name.
///
/// Flat keys (as posted by a browser: `user[email]`) win over nested
/// structures (as produced by a wrapped model: `{"user": {"email": ..}}`).
pub fn lookup_path<'a>(data: &'a Map<String, Value>, qualified: &str) -> Option<&'a Value> {
    if let Some(value) = data.get(qualified) {
        return Some(value);
    }

    let segments = name_segments(qualified);
    let (first, rest) = segments.split_first()?;
    let mut current = data.get(*first)?;

    for segment in rest {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Turn a raw field name into a human label: `first_name` -> `First name`
pub fn format_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
