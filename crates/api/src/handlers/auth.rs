//! Handlers for the `/auth` resource (register, login, logout).

use artellico_core::error::CoreError;
use artellico_db::models::user::SessionUser;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::auth::service::{self, RegisterInput};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::session::{clear_session_cookie, session_cookie, SessionMetadata, SESSION_COOKIE_NAME};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address or username.
    pub identifier: String,
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create a new account. Does not open a session; the client follows up with
/// a login.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionUser>>)> {
    let user = service::register(
        &state.pool,
        RegisterInput {
            email: input.email,
            username: input.username,
            password: input.password,
            display_name: input.display_name,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// POST /auth/login
///
/// Authenticate with email-or-username + password. On success the session
/// cookie is set on the response and the resolved user is returned.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<DataResponse<SessionUser>>)> {
    let meta = session_metadata(&headers);

    let Some(outcome) =
        service::login(&state.pool, &input.identifier, &input.password, meta).await?
    else {
        // Unknown identifier and wrong password produce the same response.
        return Err(CoreError::Unauthorized("Invalid credentials".into()).into());
    };

    let jar = jar.add(session_cookie(outcome.token, state.config.secure_cookies));

    Ok((jar, Json(DataResponse { data: outcome.user })))
}

/// POST /auth/logout
///
/// Revoke the current session (if any), clear the cookie, and redirect to
/// the auth page. Idempotent: logging out without a session still succeeds.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        service::logout(&state.pool, cookie.value()).await?;
    }

    let jar = jar.add(clear_session_cookie());

    Ok((jar, (StatusCode::FOUND, [(header::LOCATION, "/auth")])).into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Best-effort client metadata from request headers.
fn session_metadata(headers: &HeaderMap) -> SessionMetadata {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    // First hop of X-Forwarded-For; absent when the service is hit directly.
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    SessionMetadata {
        user_agent,
        ip_address,
    }
}
