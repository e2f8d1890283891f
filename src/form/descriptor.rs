// Field descriptor: one named, typed field with its option bag

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::field_type::{FieldType, Widget};
use super::naming;
use super::options::{option_bool, option_str, Options};

/// Describes a single form field.
///
/// The qualified name is derived from the raw name and the enclosing form
/// name at construction; only a rename of the enclosing form moves it.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    qualified_name: String,
    field_type: Arc<dyn FieldType>,
    options: Options,
    rendered: bool,
}

impl FieldDescriptor {
    pub fn new(
        name: &str,
        form_name: Option<&str>,
        field_type: Arc<dyn FieldType>,
        options: Options,
    ) -> Self {
        Self {
            name: name.to_string(),
            qualified_name: naming::qualify(name, form_name),
            field_type,
            options,
            rendered: false,
        }
    }

    /// Raw name, used as the registry key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespaced name sent to the client and the validator
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn kind(&self) -> &str {
        self.field_type.kind()
    }

    pub fn field_type(&self) -> &Arc<dyn FieldType> {
        &self.field_type
    }

    pub fn widget(&self) -> Widget {
        self.field_type.widget()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn label(&self) -> String {
        option_str(&self.options, "label")
            .map(str::to_string)
            .unwrap_or_else(|| naming::format_label(&self.name))
    }

    /// Declared validation rules, `None` when absent or empty
    pub fn rules(&self) -> Option<&Value> {
        match self.options.get("rules")? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::Array(items) if items.is_empty() => None,
            rules => Some(rules),
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn is_disabled(&self) -> bool {
        self.options
            .get("attr")
            .and_then(Value::as_object)
            .and_then(|attr| option_bool(attr, "disabled"))
            .unwrap_or(false)
    }

    pub(crate) fn set_qualified_name(&mut self, qualified_name: String) {
        self.qualified_name = qualified_name;
    }

    pub(crate) fn set_rendered(&mut self, rendered: bool) {
        self.rendered = rendered;
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        let attr = self
            .options
            .entry("attr")
            .or_insert_with(|| Value::Object(Options::new()));

        if !attr.is_object() {
            *attr = Value::Object(Options::new());
        }

        if let Value::Object(attr) = attr {
            if disabled {
                attr.insert("disabled".to_string(), Value::String("disabled".to_string()));
            } else {
                attr.remove("disabled");
            }
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("qualified_name", &self.qualified_name)
            .field("kind", &self.kind())
            .field("options", &self.options)
            .field("rendered", &self.rendered)
            .finish()
    }
}
