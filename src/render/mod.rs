// Askama-backed form renderer

mod views;

use anyhow::bail;
use askama::Template;

use crate::config::DEFAULT_FORM_TEMPLATE;
use crate::form::{RenderContext, Renderer};

pub use views::{AttrView, ChoiceView, FieldView, FormStartView};

#[derive(Template)]
#[template(path = "form.html")]
struct FormTemplate {
    show_start: bool,
    show_fields: bool,
    show_end: bool,
    start: FormStartView,
    fields: Vec<FieldView>,
    wrapper_class: String,
    label_class: String,
    error_class: String,
    help_class: String,
}

/// Renders forms with the compiled `form.html` template.
///
/// Only the `formwright::form` template id is known; any other id is an
/// error so a misconfigured template does not silently fall back.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskamaRenderer;

impl Renderer for AskamaRenderer {
    fn render(&self, template_id: &str, context: &RenderContext<'_>) -> anyhow::Result<String> {
        if template_id != DEFAULT_FORM_TEMPLATE {
            bail!("Unknown form template '{}'", template_id);
        }

        let defaults = &context.form.helper().settings().defaults;
        let fields = context
            .fields
            .iter()
            .filter(|field| !context.exclude.iter().any(|name| name == field.name()))
            .map(|field| FieldView::build(field, context.form, defaults))
            .collect();

        let template = FormTemplate {
            show_start: context.show_start,
            show_fields: context.show_fields,
            show_end: context.show_end,
            start: FormStartView::from_context(context),
            fields,
            wrapper_class: defaults.wrapper_class.clone(),
            label_class: defaults.label_class.clone(),
            error_class: defaults.error_class.clone(),
            help_class: defaults.help_class.clone(),
        };

        Ok(template.render()?)
    }
}
