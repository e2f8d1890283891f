// HTTP handlers for the demo registration pages

pub mod common;
pub mod registration;
