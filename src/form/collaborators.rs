// Interfaces the form core delegates to: validator, renderer, request
// input and model conversion

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::controller::Form;
use super::descriptor::FieldDescriptor;
use super::options::Options;
use super::rules::{AttributeMap, RuleMap};

/// Custom validation messages, keyed by `field.rule` or `rule`
pub type MessageMap = HashMap<String, String>;

/// Error messages per qualified field name, in rule order
pub type ErrorBag = IndexMap<String, Vec<String>>;

/// Result of running a validator over some input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    errors: ErrorBag,
}

impl ValidationOutcome {
    pub fn new(errors: ErrorBag) -> Self {
        Self { errors }
    }

    pub fn fails(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn passes(&self) -> bool {
        !self.fails()
    }

    pub fn messages(&self) -> &ErrorBag {
        &self.errors
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }
}

/// Runs a rule map against input data
pub trait Validator: Send + Sync {
    fn make(
        &self,
        input: &Map<String, Value>,
        rules: &RuleMap,
        messages: &MessageMap,
        attributes: &AttributeMap,
    ) -> anyhow::Result<ValidationOutcome>;
}

/// Everything a template needs to draw (part of) a form
pub struct RenderContext<'a> {
    pub form_options: Options,
    pub fields: Vec<&'a FieldDescriptor>,
    pub model: &'a Value,
    pub exclude: &'a [String],
    pub show_start: bool,
    pub show_fields: bool,
    pub show_end: bool,
    /// Back-reference for option, data and error lookups while rendering
    pub form: &'a Form,
}

/// Turns a template id and a render context into markup
pub trait Renderer: Send + Sync {
    fn render(&self, template_id: &str, context: &RenderContext<'_>) -> anyhow::Result<String>;
}

/// Source of the submitted input used when validating
pub trait RequestSource: Send + Sync {
    fn all_inputs(&self) -> Map<String, Value>;
}

impl RequestSource for Map<String, Value> {
    fn all_inputs(&self) -> Map<String, Value> {
        self.clone()
    }
}

impl RequestSource for HashMap<String, String> {
    fn all_inputs(&self) -> Map<String, Value> {
        self.iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect()
    }
}

/// Converts a bound model into a mapping for namespacing and lookups
pub trait ModelAdapter: Send + Sync {
    fn to_mapping(&self, model: &Value) -> Option<Map<String, Value>>;
}

/// Objects map to themselves; anything else has no mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelAdapter;

impl ModelAdapter for JsonModelAdapter {
    fn to_mapping(&self, model: &Value) -> Option<Map<String, Value>> {
        model.as_object().cloned()
    }
}
