use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Template id used when a form carries no `template` option
pub const DEFAULT_FORM_TEMPLATE: &str = "formwright::form";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FormSettings {
    pub form_template: String,
    pub defaults: FieldDefaults,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomFieldSettings>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            form_template: DEFAULT_FORM_TEMPLATE.to_string(),
            defaults: FieldDefaults::default(),
            custom_fields: Vec::new(),
        }
    }
}

/// Css classes applied by the bundled renderer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FieldDefaults {
    pub wrapper_class: String,
    pub label_class: String,
    pub field_class: String,
    pub error_class: String,
    pub help_class: String,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            wrapper_class: "form-group".to_string(),
            label_class: "control-label".to_string(),
            field_class: "form-control".to_string(),
            error_class: "text-danger".to_string(),
            help_class: "help-block".to_string(),
        }
    }
}

/// A field kind declared in configuration, reusing a built-in kind's widget
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CustomFieldSettings {
    pub kind: String,
    pub base: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}
