//! Page placeholders for the server-rendered shell.
//!
//! The real UI is a separate frontend; these handlers exist so the route
//! policy has page paths to protect and tests have something to hit.

use axum::response::Html;

fn page(title: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><title>{title} - Artellico</title></head>\
         <body><h1>{title}</h1></body></html>"
    ))
}

/// GET /
pub async fn home() -> Html<String> {
    page("Home")
}

/// GET /auth
pub async fn auth() -> Html<String> {
    page("Sign in")
}

/// GET /editor
pub async fn editor() -> Html<String> {
    page("Editor")
}

/// GET /settings
pub async fn settings() -> Html<String> {
    page("Settings")
}

/// GET /literatur
pub async fn literatur() -> Html<String> {
    page("Literatur")
}
