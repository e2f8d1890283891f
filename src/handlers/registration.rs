// Registration form definitions and the /register handlers

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::AppError,
    form::{options, Form, FormDefinition, FormHelper, FormInput, FormResult},
    handlers::common::{PageTemplate, SubmittedTemplate},
    AppState,
};

pub const REGISTRATION_FORM: &str = "registration";
pub const ADDRESS_FORM: &str = "address";

/// Postal address, composed into the registration form as `address[...]`
pub struct AddressForm;

impl FormDefinition for AddressForm {
    fn build_form(&self, form: &mut Form) -> FormResult<()> {
        form.add("street", "text", options(json!({ "rules": "required" })))?
            .add("city", "text", options(json!({ "rules": "required" })))?
            .add(
                "country",
                "select",
                options(json!({
                    "choices_data": "countries",
                    "rules": "required|in:de,fr,us",
                })),
            )?;
        Ok(())
    }

    fn definition_name(&self) -> &str {
        "AddressForm"
    }
}

pub struct RegistrationForm;

impl FormDefinition for RegistrationForm {
    fn build_form(&self, form: &mut Form) -> FormResult<()> {
        form.add("name", "text", options(json!({ "rules": "required" })))?
            .add(
                "email",
                "email",
                options(json!({ "label": "E-mail", "rules": "required|email" })),
            )?
            .add("age", "number", options(json!({ "rules": "numeric|min:18" })))?
            .add(
                "bio",
                "textarea",
                options(json!({ "help": "A few words about yourself" })),
            )?
            .add(
                "newsletter",
                "checkbox",
                options(json!({ "label": "Send me the newsletter" })),
            )?;

        let address = form.child_form(
            ADDRESS_FORM,
            "address",
            options(json!({ "model": form.get_model().clone() })),
        )?;
        form.compose(address, options(json!({})), false)?;

        form.add("submit", "submit", options(json!({ "label": "Register" })))?;
        Ok(())
    }

    fn definition_name(&self) -> &str {
        "RegistrationForm"
    }
}

/// Register the demo form definitions on a helper
pub fn register_forms(helper: FormHelper) -> FormHelper {
    helper
        .register_form(REGISTRATION_FORM, RegistrationForm)
        .register_form(ADDRESS_FORM, AddressForm)
}

fn countries() -> Value {
    json!({ "de": "Germany", "fr": "France", "us": "United States" })
}

fn registration_form(state: &AppState, model: Value) -> Result<Form, AppError> {
    let form = state.forms.create(
        REGISTRATION_FORM,
        options(json!({
            "method": "POST",
            "url": "/register",
            "model": model,
            "data": { "countries": countries() },
        })),
    )?;
    Ok(form)
}

fn render_page(form: &mut Form) -> Result<String, AppError> {
    let body = form.render_all()?;
    let page = PageTemplate {
        title: "Register",
        body: &body,
    };
    Ok(page.render()?)
}

// GET /register - Show the empty registration form
pub async fn register_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let mut form = registration_form(&state, Value::Null)?;
    Ok(Html(render_page(&mut form)?))
}

// POST /register - Validate the submission, re-render on failure
pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Response, AppError> {
    let input = FormInput::from_urlencoded(&body);

    let mut form = registration_form(&state, Value::Object(input.values().clone()))?;
    form.set_request(input.clone());

    if !form.is_valid()? {
        let failed = form.get_errors()?.len();
        tracing::info!(fields = failed, "registration rejected");
        let page = render_page(&mut form)?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
    }

    // Only echo back what the form declares
    let values = form
        .get_fields()
        .into_iter()
        .filter(|field| field.kind() != "submit")
        .map(|field| {
            let value = input
                .get(field.qualified_name())
                .and_then(crate::form::options::value_to_text)
                .unwrap_or_default();
            (field.label(), value)
        })
        .collect();

    tracing::info!("registration accepted");
    let page = SubmittedTemplate {
        title: "Registered",
        values,
    };
    Ok(Html(page.render()?).into_response())
}
