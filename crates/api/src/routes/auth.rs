//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, pages};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// GET  /          -> sign-in page (redirects away when already signed in)
/// POST /register  -> register
/// POST /login     -> login (sets session cookie)
/// POST /logout    -> logout (clears cookie, 302 to /auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::auth))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}
