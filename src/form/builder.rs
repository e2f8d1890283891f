// Form factory and the shared collaborators every form is built with

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;

use super::collaborators::{JsonModelAdapter, ModelAdapter, Renderer, Validator};
use super::controller::Form;
use super::error::{FormError, FormResult};
use super::field_type::{FieldTypeRegistry, TypeResolver};
use super::options::{options, Options};
use crate::config::FormSettings;

/// User-defined form: declares its fields through `Form::add` / `compose`.
///
/// `build_form` runs once when the form is created and is replayed when
/// the form is rebuilt (after a name or model change). During a replay,
/// adds for names that are not already registered are ignored.
pub trait FormDefinition: Send + Sync {
    fn build_form(&self, form: &mut Form) -> FormResult<()>;

    /// Name used in error messages
    fn definition_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> FormDefinition for F
where
    F: Fn(&mut Form) -> FormResult<()> + Send + Sync,
{
    fn build_form(&self, form: &mut Form) -> FormResult<()> {
        self(form)
    }

    fn definition_name(&self) -> &str {
        "Form"
    }
}

/// Collaborators shared by every form of an application
pub struct FormHelper {
    settings: FormSettings,
    types: Arc<dyn TypeResolver>,
    renderer: Arc<dyn Renderer>,
    validator: Arc<dyn Validator>,
    model_adapter: Arc<dyn ModelAdapter>,
    definitions: HashMap<String, Arc<dyn FormDefinition>>,
}

impl FormHelper {
    /// Build a helper with the built-in field types plus the custom kinds
    /// declared in `settings`
    pub fn new(
        settings: FormSettings,
        renderer: Arc<dyn Renderer>,
        validator: Arc<dyn Validator>,
    ) -> anyhow::Result<Self> {
        let mut types = FieldTypeRegistry::new();
        for custom in &settings.custom_fields {
            types
                .register_custom(&custom.kind, &custom.base, options(custom.options.clone()))
                .with_context(|| format!("Failed to register custom field '{}'", custom.kind))?;
        }

        Ok(Self {
            settings,
            types: Arc::new(types),
            renderer,
            validator,
            model_adapter: Arc::new(JsonModelAdapter),
            definitions: HashMap::new(),
        })
    }

    pub fn with_types(mut self, types: Arc<dyn TypeResolver>) -> Self {
        self.types = types;
        self
    }

    pub fn with_model_adapter(mut self, adapter: Arc<dyn ModelAdapter>) -> Self {
        self.model_adapter = adapter;
        self
    }

    /// Register a form definition under a type id usable by
    /// `FormBuilder::create` and `Form::compose`
    pub fn register_form(mut self, id: &str, definition: impl FormDefinition + 'static) -> Self {
        self.definitions.insert(id.to_string(), Arc::new(definition));
        self
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn types(&self) -> &dyn TypeResolver {
        self.types.as_ref()
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    pub fn model_adapter(&self) -> &dyn ModelAdapter {
        self.model_adapter.as_ref()
    }

    pub fn definition(&self, id: &str) -> Option<Arc<dyn FormDefinition>> {
        self.definitions.get(id).cloned()
    }
}

/// Creates forms from registered definitions
#[derive(Clone)]
pub struct FormBuilder {
    helper: Arc<FormHelper>,
}

impl FormBuilder {
    pub fn new(helper: FormHelper) -> Self {
        Self {
            helper: Arc::new(helper),
        }
    }

    pub fn from_helper(helper: Arc<FormHelper>) -> Self {
        Self { helper }
    }

    pub fn helper(&self) -> &Arc<FormHelper> {
        &self.helper
    }

    /// Create and build the form registered under `id`
    pub fn create(&self, id: &str, form_options: Options) -> FormResult<Form> {
        let definition = self
            .helper
            .definition(id)
            .ok_or_else(|| FormError::InvalidCompositionSource(id.to_string()))?;
        self.create_from(definition, form_options)
    }

    /// Create and build a form from an unregistered definition
    pub fn create_from(
        &self,
        definition: Arc<dyn FormDefinition>,
        form_options: Options,
    ) -> FormResult<Form> {
        let mut form = Form::new(self.helper.clone(), Some(definition));
        form.set_form_options(form_options)?;
        form.build_form()?;

        tracing::debug!(
            form = form.definition_name(),
            fields = form.get_fields().len(),
            "built form"
        );
        Ok(form)
    }

    /// Create an empty form whose fields are added by the caller
    pub fn plain(&self, form_options: Options) -> FormResult<Form> {
        let mut form = Form::new(self.helper.clone(), None);
        form.set_form_options(form_options)?;
        Ok(form)
    }

    /// Create the form registered under `id` as a child form named
    /// `child_name`, the full name of the parent field it stands for.
    /// `Form::child_form` derives that name from the parent.
    pub fn child_form(
        &self,
        id: &str,
        child_name: &str,
        form_options: Options,
    ) -> FormResult<super::ChildForm> {
        let mut form_options = form_options;
        form_options.insert(
            "name".to_string(),
            serde_json::Value::String(child_name.to_string()),
        );
        let form = self.create(id, form_options)?;
        Ok(super::ChildForm::new(form))
    }
}
