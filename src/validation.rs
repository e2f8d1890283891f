// Validation functions for formwright
// Provides a small rule validator behind the form `Validator` interface

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use url::Url;

use crate::form::naming;
use crate::form::{AttributeMap, ErrorBag, MessageMap, RuleMap, ValidationOutcome, Validator};

/// Validator for `required|email|min:3` style rules.
///
/// Supported rules: `required`, `email`, `numeric`, `integer`, `min:n`,
/// `max:n`, `in:a,b`, `url`, `alpha_dash` and `confirmed`. Rules other than
/// `required` are skipped for empty values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

/// One parsed rule: `min:3` becomes `Rule { name: "min", params: ["3"] }`
#[derive(Debug, Clone, PartialEq)]
struct Rule {
    name: String,
    params: Vec<String>,
}

impl Validator for RuleValidator {
    fn make(
        &self,
        input: &Map<String, Value>,
        rules: &RuleMap,
        messages: &MessageMap,
        attributes: &AttributeMap,
    ) -> Result<ValidationOutcome> {
        let mut errors = ErrorBag::new();

        for (field, declared) in rules {
            let field_rules = parse_rules(declared)
                .with_context(|| format!("Invalid rules for field '{}'", field))?;
            let value = naming::lookup_path(input, field);
            let attribute = attribute_name(field, attributes);
            let numeric = field_rules
                .iter()
                .any(|r| r.name == "numeric" || r.name == "integer");

            let mut field_errors = Vec::new();
            for rule in &field_rules {
                if rule.name != "required" && is_blank(value) {
                    continue;
                }

                if !check_rule(rule, field, value, input, numeric)? {
                    field_errors.push(message_for(rule, field, &attribute, value, numeric, messages));
                }
            }

            if !field_errors.is_empty() {
                errors.insert(field.clone(), field_errors);
            }
        }

        Ok(ValidationOutcome::new(errors))
    }
}

fn parse_rules(declared: &Value) -> Result<Vec<Rule>> {
    let raw: Vec<&str> = match declared {
        Value::String(s) => s.split('|').collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().context("rule entries must be strings"))
            .collect::<Result<_>>()?,
        Value::Null => Vec::new(),
        other => bail!("unsupported rule value {}", other),
    };

    Ok(raw
        .into_iter()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| {
            let (name, params) = r.split_once(':').unwrap_or((r, ""));
            Rule {
                name: name.to_string(),
                params: params
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
            }
        })
        .collect())
}

fn check_rule(
    rule: &Rule,
    field: &str,
    value: Option<&Value>,
    input: &Map<String, Value>,
    numeric: bool,
) -> Result<bool> {
    let passes = match rule.name.as_str() {
        "required" => !is_blank(value),
        "email" => value.and_then(Value::as_str).is_some_and(is_valid_email),
        "numeric" => value.and_then(as_number).is_some(),
        "integer" => value.is_some_and(is_integer),
        "min" | "max" => {
            let bound = param_number(rule).with_context(|| {
                format!("Rule '{}' on field '{}' needs a numeric parameter", rule.name, field)
            })?;
            size_of(value, numeric).is_some_and(|size| {
                if rule.name == "min" {
                    size >= bound
                } else {
                    size <= bound
                }
            })
        }
        "in" => value
            .and_then(value_text)
            .is_some_and(|text| rule.params.iter().any(|p| *p == text)),
        "url" => value.and_then(Value::as_str).is_some_and(is_valid_url),
        "alpha_dash" => value
            .and_then(value_text)
            .is_some_and(|text| is_alpha_dash(&text)),
        "confirmed" => naming::lookup_path(input, &confirmation_key(field)) == value,
        other => bail!("Unsupported validation rule '{}' on field '{}'", other, field),
    };

    Ok(passes)
}

/// Check if a value counts as "not provided"
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

/// Size used by `min`/`max`: the number itself for numeric fields, the
/// item count for lists, the character count otherwise
fn size_of(value: Option<&Value>, numeric: bool) -> Option<f64> {
    let value = value?;
    if numeric {
        return as_number(value);
    }
    match value {
        Value::Array(items) => Some(items.len() as f64),
        other => value_text(other).map(|text| text.chars().count() as f64),
    }
}

fn param_number(rule: &Rule) -> Option<f64> {
    rule.params.first()?.parse::<f64>().ok()
}

/// Check that an address has one `@`, a local part and a dotted domain
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Only http and https urls with a host are accepted
fn is_valid_url(raw: &str) -> bool {
    match raw.parse::<Url>() {
        Ok(url) => (url.scheme() == "http" || url.scheme() == "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

fn is_alpha_dash(text: &str) -> bool {
    text.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// `password` -> `password_confirmation`, `user[password]` ->
/// `user[password_confirmation]`
fn confirmation_key(field: &str) -> String {
    match field.strip_suffix(']') {
        Some(stem) => format!("{}_confirmation]", stem),
        None => format!("{}_confirmation", field),
    }
}

fn attribute_name(field: &str, attributes: &AttributeMap) -> String {
    if let Some(label) = attributes.get(field) {
        return label.clone();
    }
    let segments = naming::name_segments(field);
    let last = segments.last().copied().unwrap_or(field);
    last.replace('_', " ")
}

fn message_for(
    rule: &Rule,
    field: &str,
    attribute: &str,
    value: Option<&Value>,
    numeric: bool,
    messages: &MessageMap,
) -> String {
    let custom = messages
        .get(&format!("{}.{}", field, rule.name))
        .or_else(|| messages.get(&rule.name));

    let template = match custom {
        Some(template) => template.clone(),
        None => default_message(rule, value, numeric).to_string(),
    };

    let param = rule.params.first().map(String::as_str).unwrap_or_default();
    template
        .replace(":attribute", attribute)
        .replace(":min", param)
        .replace(":max", param)
        .replace(":values", &rule.params.join(", "))
}

fn default_message(rule: &Rule, value: Option<&Value>, numeric: bool) -> &'static str {
    let is_list = matches!(value, Some(Value::Array(_)));
    match (rule.name.as_str(), numeric, is_list) {
        ("required", ..) => "The :attribute field is required.",
        ("email", ..) => "The :attribute must be a valid email address.",
        ("numeric", ..) => "The :attribute must be a number.",
        ("integer", ..) => "The :attribute must be an integer.",
        ("min", true, _) => "The :attribute must be at least :min.",
        ("min", false, true) => "The :attribute must have at least :min items.",
        ("min", false, false) => "The :attribute must be at least :min characters.",
        ("max", true, _) => "The :attribute may not be greater than :max.",
        ("max", false, true) => "The :attribute may not have more than :max items.",
        ("max", false, false) => "The :attribute may not be greater than :max characters.",
        ("in", ..) => "The selected :attribute is invalid.",
        ("url", ..) => "The :attribute format is invalid.",
        ("alpha_dash", ..) => {
            "The :attribute may only contain letters, numbers, dashes and underscores."
        }
        ("confirmed", ..) => "The :attribute confirmation does not match.",
        _ => "The :attribute is invalid.",
    }
}
