pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod render;
pub mod validation;

use axum::{http::Uri, response::Redirect, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use config::FormSettings;
use error::AppError;
use form::{FormBuilder, FormHelper};
use render::AskamaRenderer;
use validation::RuleValidator;

// Application state
pub struct AppState {
    pub forms: FormBuilder,
}

/// Helper wired with the askama renderer and the rule validator
pub fn default_helper(settings: FormSettings) -> anyhow::Result<FormHelper> {
    FormHelper::new(settings, Arc::new(AskamaRenderer), Arc::new(RuleValidator))
}

async fn index() -> Redirect {
    Redirect::to("/register")
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No page at {}", uri.path()))
}

// Public function to create the router
pub fn create_router(settings: FormSettings) -> anyhow::Result<Router> {
    let helper = handlers::registration::register_forms(default_helper(settings)?);
    let state = Arc::new(AppState {
        forms: FormBuilder::new(helper),
    });

    let router = Router::new()
        .route("/", get(index))
        .route(
            "/register",
            get(handlers::registration::register_page)
                .post(handlers::registration::register_submit),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}
