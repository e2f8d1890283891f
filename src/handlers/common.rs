// Page templates shared across handlers

use askama::Template;

/// Full html page around pre-rendered markup
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

#[derive(Template)]
#[template(path = "submitted.html")]
pub struct SubmittedTemplate<'a> {
    pub title: &'a str,
    pub values: Vec<(String, String)>,
}
