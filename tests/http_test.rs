// Integration tests for the registration pages
// These drive the router with `oneshot`, no listener involved

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use formwright::config::FormSettings;
use tower::ServiceExt; // for `oneshot`

fn create_test_app() -> axum::Router {
    formwright::create_router(FormSettings::default()).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_redirects_to_register() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/register");
}

#[tokio::test]
async fn test_register_page_renders_form() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/register").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response.into_body()).await;
    assert!(body.contains("<title>Register - Formwright</title>"));
    assert!(body.contains("<form method=\"POST\""));
    assert!(body.contains("name=\"email\""));
    assert!(body.contains("name=\"address[street]\""));
    assert!(body.contains("<option value=\"fr\">France</option>"));
    assert!(body.contains(">Register</button>"));
}

#[tokio::test]
async fn test_invalid_submission_is_unprocessable() {
    let app = create_test_app();

    let response = app
        .oneshot(post_form("name=Ada&email=nope&age=12&address%5Bcountry%5D=fr"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = common::body_string(response.into_body()).await;
    assert!(body.contains("The E-mail must be a valid email address."));
    assert!(body.contains("The Age must be at least 18."));
    assert!(body.contains("The Street field is required."));
    // Submitted values are kept
    assert!(body.contains("value=\"Ada\""));
    assert!(body.contains("<option value=\"fr\" selected>France</option>"));
}

#[tokio::test]
async fn test_valid_submission_is_confirmed() {
    let app = create_test_app();

    let response = app
        .oneshot(post_form(
            "name=Ada+Lovelace&email=ada%40example.com&age=36&newsletter=1\
             &address%5Bstreet%5D=Main+St&address%5Bcity%5D=London&address%5Bcountry%5D=us",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response.into_body()).await;
    assert!(body.contains("your registration was received"));
    assert!(body.contains("<dd>Ada Lovelace</dd>"));
    assert!(body.contains("<dd>ada@example.com</dd>"));
    assert!(body.contains("<dd>London</dd>"));
}

#[tokio::test]
async fn test_country_must_be_a_known_choice() {
    let app = create_test_app();

    let response = app
        .oneshot(post_form(
            "name=Ada&email=ada%40example.com\
             &address%5Bstreet%5D=Main&address%5Bcity%5D=Oslo&address%5Bcountry%5D=no",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = common::body_string(response.into_body()).await;
    assert!(body.contains("The selected Country is invalid."));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = common::body_string(response.into_body()).await;
    assert!(body.contains("No page at"));
    assert!(body.contains("nope"));
}
