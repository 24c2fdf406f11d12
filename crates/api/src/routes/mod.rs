pub mod auth;
pub mod health;
pub mod pages;

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /account                   current identity (GET), profile update (PUT),
///                            erase account (DELETE)
/// /account/settings          merge settings patch (PUT)
/// /account/sessions          active sessions (GET)
/// /account/password          change password (PUT)
/// /account/logout-all        revoke all sessions (POST)
/// /subscription              tier/expiry/validity view (GET)
/// /notes                     owned-content listing (GET, entitlement-gated)
/// ```
///
/// Authentication and entitlement are enforced by the request gate, not per
/// route.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/account",
            get(handlers::account::current_user)
                .put(handlers::account::update_profile)
                .delete(handlers::account::delete_account),
        )
        .route("/account/settings", put(handlers::account::update_settings))
        .route("/account/sessions", get(handlers::account::list_sessions))
        .route("/account/password", put(handlers::account::change_password))
        .route("/account/logout-all", post(handlers::account::logout_all))
        .route("/subscription", get(handlers::account::subscription))
        .route("/notes", get(handlers::notes::list_notes))
}
