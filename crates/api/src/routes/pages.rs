//! Route definitions for the server-rendered page shell.

use axum::routing::get;
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// Top-level page routes. `/auth` lives in [`crate::routes::auth`].
///
/// ```text
/// GET /           -> home (public)
/// GET /editor     -> editor (protected, entitlement-gated)
/// GET /settings   -> settings (protected)
/// GET /literatur  -> literature library (protected, entitlement-gated)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/editor", get(pages::editor))
        .route("/settings", get(pages::settings))
        .route("/literatur", get(pages::literatur))
}
