// Display structs handed to the askama form template

use serde_json::Value;

use crate::config::FieldDefaults;
use crate::form::options::{is_truthy, option_bool, option_str, value_to_text};
use crate::form::{FieldDescriptor, Form, RenderContext, Widget};

/// Methods a browser can submit; anything else is spoofed through `_method`
const NATIVE_METHODS: [&str; 2] = ["GET", "POST"];

#[derive(Debug, Clone, PartialEq)]
pub struct AttrView {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: String,
    pub id: String,
    pub label: String,
    pub show_label: bool,
    pub widget: String,
    pub input_type: String,
    pub value: String,
    pub checked: bool,
    pub attrs: Vec<AttrView>,
    pub choices: Vec<ChoiceView>,
    pub help: String,
    pub errors: Vec<String>,
}

/// Opening tag attributes
#[derive(Debug, Clone, PartialEq)]
pub struct FormStartView {
    pub method: String,
    pub spoofed_method: String,
    pub action: String,
    pub enctype: String,
    pub class: String,
}

impl FormStartView {
    pub fn from_context(context: &RenderContext<'_>) -> Self {
        let options = &context.form_options;
        let requested = option_str(options, "method")
            .unwrap_or("GET")
            .to_uppercase();

        let (method, spoofed_method) = if NATIVE_METHODS.contains(&requested.as_str()) {
            (requested, String::new())
        } else {
            ("POST".to_string(), requested)
        };

        let enctype = if option_bool(options, "files").unwrap_or(false) {
            "multipart/form-data".to_string()
        } else {
            String::new()
        };

        Self {
            method,
            spoofed_method,
            action: option_str(options, "url").unwrap_or_default().to_string(),
            enctype,
            class: option_str(options, "class").unwrap_or_default().to_string(),
        }
    }
}

impl FieldView {
    pub fn build(field: &FieldDescriptor, form: &Form, defaults: &FieldDefaults) -> Self {
        let widget = field.widget();
        let value = form.field_value(field);

        let (value_text, checked) = match widget {
            Widget::Checkbox => {
                let submitted = field
                    .option("value")
                    .and_then(value_to_text)
                    .unwrap_or_else(|| "1".to_string());
                let from_model = form
                    .get_model()
                    .as_object()
                    .and_then(|model| crate::form::naming::lookup_path(model, field.qualified_name()))
                    .map(is_truthy)
                    .unwrap_or(false);
                let checked = from_model || option_bool(field.options(), "checked").unwrap_or(false);
                (submitted, checked)
            }
            Widget::Button => (String::new(), false),
            _ if field.field_type().input_type() == "password" => (String::new(), false),
            _ => (value.as_ref().and_then(value_to_text).unwrap_or_default(), false),
        };

        let errors = if form.have_errors_enabled() {
            form.validation()
                .and_then(|outcome| outcome.messages().get(field.qualified_name()))
                .cloned()
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let attrs = build_attrs(field, form, defaults);
        let id = attrs
            .iter()
            .find(|attr| attr.name == "id")
            .map(|attr| attr.value.clone())
            .unwrap_or_else(|| field_id(field));

        Self {
            name: field.qualified_name().to_string(),
            id,
            label: field.label(),
            show_label: option_bool(field.options(), "label_show").unwrap_or(true)
                && !matches!(widget, Widget::Button | Widget::Checkbox),
            widget: widget.as_str().to_string(),
            input_type: field.field_type().input_type().to_string(),
            value: value_text,
            checked,
            attrs,
            choices: build_choices(field, form, value.as_ref()),
            help: option_str(field.options(), "help").unwrap_or_default().to_string(),
            errors,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.widget == Widget::Input.as_str() && self.input_type == "hidden"
    }
}

/// Html id derived from the qualified name: `user[email]` -> `user_email`
fn field_id(field: &FieldDescriptor) -> String {
    crate::form::naming::name_segments(field.qualified_name()).join("_")
}

fn build_attrs(field: &FieldDescriptor, form: &Form, defaults: &FieldDefaults) -> Vec<AttrView> {
    let mut attrs: Vec<AttrView> = Vec::new();

    if let Some(declared) = field.option("attr").and_then(Value::as_object) {
        for (name, value) in declared {
            let value = match value {
                Value::Bool(true) => name.clone(),
                other => match value_to_text(other) {
                    Some(text) => text,
                    None => continue,
                },
            };
            attrs.push(AttrView {
                name: name.clone(),
                value,
            });
        }
    }

    let has = |attrs: &[AttrView], name: &str| attrs.iter().any(|a| a.name == name);

    if !has(&attrs, "id") {
        attrs.push(AttrView {
            name: "id".to_string(),
            value: field_id(field),
        });
    }

    let styled = !matches!(
        field.widget(),
        Widget::Checkbox | Widget::Radio | Widget::Button | Widget::Static
    );
    if styled && !has(&attrs, "class") && !defaults.field_class.is_empty() {
        attrs.push(AttrView {
            name: "class".to_string(),
            value: defaults.field_class.clone(),
        });
    }

    if form.client_validation_enabled() && requires_value(field) && !has(&attrs, "required") {
        attrs.push(AttrView {
            name: "required".to_string(),
            value: "required".to_string(),
        });
    }

    attrs
}

/// Whether the declared rules include `required`
fn requires_value(field: &FieldDescriptor) -> bool {
    match field.rules() {
        Some(Value::String(rules)) => rules.split('|').any(|r| r.trim() == "required"),
        Some(Value::Array(rules)) => rules
            .iter()
            .filter_map(Value::as_str)
            .any(|r| r.trim() == "required"),
        _ => false,
    }
}

fn build_choices(field: &FieldDescriptor, form: &Form, value: Option<&Value>) -> Vec<ChoiceView> {
    if !matches!(field.widget(), Widget::Select | Widget::Radio) {
        return Vec::new();
    }

    let selected = field.option("selected").or(value);
    let is_selected = |choice: &str| match selected {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(value_to_text)
            .any(|item| item == choice),
        Some(other) => value_to_text(other).is_some_and(|text| text == choice),
        None => false,
    };

    // Inline choices win; `choices_data` names an entry of the form's extra data
    let declared = field.option("choices").filter(|c| is_truthy(c)).or_else(|| {
        option_str(field.options(), "choices_data").and_then(|key| form.get_data(key))
    });

    let pairs: Vec<(String, String)> = match declared {
        Some(Value::Object(choices)) => choices
            .iter()
            .map(|(value, label)| {
                let label = value_to_text(label).unwrap_or_else(|| value.clone());
                (value.clone(), label)
            })
            .collect(),
        Some(Value::Array(choices)) => choices
            .iter()
            .filter_map(value_to_text)
            .map(|choice| (choice.clone(), choice))
            .collect(),
        _ => Vec::new(),
    };

    pairs
        .into_iter()
        .map(|(value, label)| ChoiceView {
            selected: is_selected(&value),
            value,
            label,
        })
        .collect()
}
