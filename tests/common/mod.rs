// Common test utilities shared across test files

use std::sync::{Arc, Mutex};

use formwright::config::FormSettings;
use formwright::form::{Form, FormBuilder, FormHelper, FormResult, RenderContext, Renderer, options};
use formwright::validation::RuleValidator;
use serde_json::json;

/// Renderer that records the fields of every render call
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingRenderer {
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
}

#[allow(dead_code)]
impl RecordingRenderer {
    pub fn rendered(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, template_id: &str, context: &RenderContext<'_>) -> anyhow::Result<String> {
        let names: Vec<String> = context
            .fields
            .iter()
            .filter(|field| !context.exclude.iter().any(|name| name == field.name()))
            .map(|field| field.qualified_name().to_string())
            .collect();
        self.calls.lock().unwrap().push(names.clone());
        Ok(format!("{}:{}", template_id, names.join(",")))
    }
}

/// Definition with two validated fields, registered as "user"
#[allow(dead_code)]
pub fn user_form(form: &mut Form) -> FormResult<()> {
    form.add("name", "text", options(json!({ "rules": "required" })))?
        .add("email", "email", options(json!({ "rules": "required|email" })))?;
    Ok(())
}

/// Definition registered as "address"
#[allow(dead_code)]
pub fn address_form(form: &mut Form) -> FormResult<()> {
    form.add("street", "text", options(json!({ "rules": "required" })))?
        .add("city", "text", options(json!({})))?;
    Ok(())
}

/// Helper with the rule validator, the given renderer and the test definitions
#[allow(dead_code)]
pub fn helper_with(renderer: Arc<dyn Renderer>) -> FormHelper {
    FormHelper::new(FormSettings::default(), renderer, Arc::new(RuleValidator))
        .unwrap()
        .register_form("user", user_form)
        .register_form("address", address_form)
}

#[allow(dead_code)]
pub fn builder() -> FormBuilder {
    FormBuilder::new(helper_with(Arc::new(RecordingRenderer::default())))
}

#[allow(dead_code)]
pub fn recording_builder() -> (FormBuilder, RecordingRenderer) {
    let renderer = RecordingRenderer::default();
    let builder = FormBuilder::new(helper_with(Arc::new(renderer.clone())));
    (builder, renderer)
}

/// Collect a response body into a string
#[allow(dead_code)]
pub async fn body_string(body: axum::body::Body) -> String {
    use http_body_util::BodyExt;

    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
