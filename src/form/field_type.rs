// Field type trait and registry
//
// A field's `kind` string is resolved once, at field creation, into a
// `FieldType` capability that tells renderers which widget to draw.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::json;

use super::error::{FormError, FormResult};
use super::options::{options, Options};

/// Widget family a renderer draws for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Input,
    TextArea,
    Select,
    Radio,
    Checkbox,
    Button,
    Static,
}

impl Widget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Widget::Input => "input",
            Widget::TextArea => "textarea",
            Widget::Select => "select",
            Widget::Radio => "radio",
            Widget::Checkbox => "checkbox",
            Widget::Button => "button",
            Widget::Static => "static",
        }
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability of a registered field kind
pub trait FieldType: Send + Sync {
    fn kind(&self) -> &str;
    fn widget(&self) -> Widget;

    /// Value of the `type` attribute for input-like widgets
    fn input_type(&self) -> &str {
        self.kind()
    }

    /// File uploads switch the owning form to multipart encoding
    fn is_file_upload(&self) -> bool {
        false
    }

    /// Options applied underneath the caller's options
    fn default_options(&self) -> Options {
        Options::new()
    }
}

/// Resolves a kind name into a field type
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, kind: &str) -> FormResult<Arc<dyn FieldType>>;
}

/// Single-line `<input>` fields
pub struct InputField {
    kind: &'static str,
}

impl FieldType for InputField {
    fn kind(&self) -> &str {
        self.kind
    }

    fn widget(&self) -> Widget {
        Widget::Input
    }
}

pub struct TextAreaField;

impl FieldType for TextAreaField {
    fn kind(&self) -> &str {
        "textarea"
    }

    fn widget(&self) -> Widget {
        Widget::TextArea
    }
}

/// Fields that pick from a `choices` option
pub struct ChoiceField {
    kind: &'static str,
    widget: Widget,
}

impl FieldType for ChoiceField {
    fn kind(&self) -> &str {
        self.kind
    }

    fn widget(&self) -> Widget {
        self.widget
    }

    fn default_options(&self) -> Options {
        options(json!({ "choices": {} }))
    }
}

pub struct CheckboxField;

impl FieldType for CheckboxField {
    fn kind(&self) -> &str {
        "checkbox"
    }

    fn widget(&self) -> Widget {
        Widget::Checkbox
    }

    fn default_options(&self) -> Options {
        options(json!({ "value": 1, "checked": false }))
    }
}

pub struct FileField;

impl FieldType for FileField {
    fn kind(&self) -> &str {
        "file"
    }

    fn widget(&self) -> Widget {
        Widget::Input
    }

    fn is_file_upload(&self) -> bool {
        true
    }
}

pub struct ButtonField {
    kind: &'static str,
}

impl FieldType for ButtonField {
    fn kind(&self) -> &str {
        self.kind
    }

    fn widget(&self) -> Widget {
        Widget::Button
    }
}

/// Read-only text rendered in place of an input
pub struct StaticField;

impl FieldType for StaticField {
    fn kind(&self) -> &str {
        "static"
    }

    fn widget(&self) -> Widget {
        Widget::Static
    }
}

/// Kind declared in configuration on top of a built-in type
pub struct CustomField {
    kind: String,
    base: Arc<dyn FieldType>,
    defaults: Options,
}

impl CustomField {
    pub fn new(kind: &str, base: Arc<dyn FieldType>, defaults: Options) -> Self {
        Self {
            kind: kind.to_string(),
            base,
            defaults,
        }
    }
}

impl FieldType for CustomField {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn widget(&self) -> Widget {
        self.base.widget()
    }

    fn input_type(&self) -> &str {
        self.base.input_type()
    }

    fn is_file_upload(&self) -> bool {
        self.base.is_file_upload()
    }

    fn default_options(&self) -> Options {
        super::options::merge_options(&self.base.default_options(), &self.defaults)
    }
}

/// Registry of field kinds, pre-populated with the built-in types
pub struct FieldTypeRegistry {
    types: HashMap<String, Arc<dyn FieldType>>,
}

impl FieldTypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            types: HashMap::new(),
        };

        for kind in [
            "text", "email", "password", "hidden", "number", "date", "url", "tel", "search",
            "color",
        ] {
            registry.register(Arc::new(InputField { kind }));
        }
        registry.register(Arc::new(TextAreaField));
        registry.register(Arc::new(ChoiceField {
            kind: "select",
            widget: Widget::Select,
        }));
        registry.register(Arc::new(ChoiceField {
            kind: "radio",
            widget: Widget::Radio,
        }));
        registry.register(Arc::new(CheckboxField));
        registry.register(Arc::new(FileField));
        registry.register(Arc::new(StaticField));
        for kind in ["submit", "reset", "button"] {
            registry.register(Arc::new(ButtonField { kind }));
        }

        registry
    }

    pub fn register(&mut self, field_type: Arc<dyn FieldType>) {
        self.types.insert(field_type.kind().to_string(), field_type);
    }

    /// Register `kind` as an alias of an already registered `base` kind
    pub fn register_custom(&mut self, kind: &str, base: &str, defaults: Options) -> FormResult<()> {
        let base = self.resolve(base)?;
        self.register(Arc::new(CustomField::new(kind, base, defaults)));
        Ok(())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.types.contains_key(kind)
    }
}

impl TypeResolver for FieldTypeRegistry {
    fn resolve(&self, kind: &str) -> FormResult<Arc<dyn FieldType>> {
        self.types
            .get(kind)
            .cloned()
            .ok_or_else(|| FormError::UnknownFieldType(kind.to_string()))
    }
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_builtins() {
        let registry = FieldTypeRegistry::new();

        assert_eq!(registry.resolve("text").unwrap().widget(), Widget::Input);
        assert_eq!(registry.resolve("textarea").unwrap().widget(), Widget::TextArea);
        assert_eq!(registry.resolve("select").unwrap().widget(), Widget::Select);
        assert!(registry.resolve("file").unwrap().is_file_upload());
        assert!(!registry.resolve("text").unwrap().is_file_upload());
    }

    #[test]
    fn test_registry_rejects_unknown_kind() {
        let registry = FieldTypeRegistry::new();

        let result = registry.resolve("hologram");
        assert!(matches!(result, Err(FormError::UnknownFieldType(kind)) if kind == "hologram"));
    }

    #[test]
    fn test_register_custom_reuses_base_widget() {
        let mut registry = FieldTypeRegistry::new();
        registry
            .register_custom("phone", "tel", options(json!({"attr": {"inputmode": "tel"}})))
            .unwrap();

        let phone = registry.resolve("phone").unwrap();
        assert_eq!(phone.kind(), "phone");
        assert_eq!(phone.input_type(), "tel");
        assert_eq!(phone.default_options()["attr"]["inputmode"], json!("tel"));
    }

    #[test]
    fn test_register_custom_requires_known_base() {
        let mut registry = FieldTypeRegistry::new();
        assert!(registry.register_custom("phone", "nope", Options::new()).is_err());
        assert!(!registry.contains("phone"));
    }
}
