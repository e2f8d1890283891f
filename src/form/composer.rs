// Merging the fields of other forms into a parent form

use serde_json::Value;

use super::builder::FormBuilder;
use super::controller::Form;
use super::descriptor::FieldDescriptor;
use super::error::FormResult;
use super::options::Options;

/// A built form standing in for a single parent field (`address[...]`)
#[derive(Debug)]
pub struct ChildForm {
    form: Form,
}

impl ChildForm {
    pub fn new(form: Form) -> Self {
        Self { form }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn into_form(self) -> Form {
        self.form
    }
}

/// Where composed fields come from
#[derive(Debug)]
pub enum CompositionSource {
    /// A ready-built form instance
    Form(Form),
    /// A child-form adapter wrapping a built form
    ChildForm(ChildForm),
    /// A registered form type id, created with the parent's model and name
    Type(String),
}

impl From<Form> for CompositionSource {
    fn from(form: Form) -> Self {
        CompositionSource::Form(form)
    }
}

impl From<ChildForm> for CompositionSource {
    fn from(child: ChildForm) -> Self {
        CompositionSource::ChildForm(child)
    }
}

impl From<&str> for CompositionSource {
    fn from(id: &str) -> Self {
        CompositionSource::Type(id.to_string())
    }
}

impl From<String> for CompositionSource {
    fn from(id: String) -> Self {
        CompositionSource::Type(id)
    }
}

/// Extract the descriptors a composition source contributes.
///
/// Descriptors keep the qualified names they were built with; a type id is
/// instantiated with the parent's model and name so its names line up.
pub fn collect_fields(
    parent: &Form,
    source: CompositionSource,
    form_options: Options,
) -> FormResult<Vec<FieldDescriptor>> {
    let form = match source {
        CompositionSource::Form(form) => form,
        CompositionSource::ChildForm(child) => child.into_form(),
        CompositionSource::Type(id) => {
            let mut form_options = form_options;
            form_options.insert("model".to_string(), parent.get_model().clone());
            if let Some(name) = parent.get_name() {
                form_options.insert("name".to_string(), Value::String(name.to_string()));
            }

            FormBuilder::from_helper(parent.helper().clone()).create(&id, form_options)?
        }
    };

    tracing::debug!(
        source = form.definition_name(),
        fields = form.get_fields().len(),
        "composing fields"
    );
    let fields: Vec<FieldDescriptor> = form.get_fields().into_iter().cloned().collect();
    Ok(fields)
}
