//! Handlers for the `/api/account` and `/api/subscription` resources.
//!
//! These stay reachable for under-entitled users: someone whose subscription
//! lapsed must still be able to inspect, manage, and erase their account.

use artellico_core::error::CoreError;
use artellico_db::models::session::SessionOverview;
use artellico_db::models::user::SessionUser;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::service;
use crate::error::AppResult;
use crate::middleware::auth::CurrentUser;
use crate::response::DataResponse;
use crate::session::{clear_session_cookie, revoke_all_sessions};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /api/account`. Absent fields keep their current
/// value.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Request body for `PUT /api/account/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Subscription view returned by `GET /api/subscription`.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub tier: artellico_db::models::user::SubscriptionTier,
    pub expires_at: Option<artellico_core::types::Timestamp>,
    /// Whether the tier currently grants access to gated features.
    pub valid: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/account
///
/// The identity the session resolved to, plus the session expiry.
pub async fn current_user(current: CurrentUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "data": {
            "user": current.user,
            "session_expires_at": current.session_expires_at,
        }
    }))
}

/// PUT /api/account
///
/// Partial profile update (display name, avatar). Returns the updated
/// identity.
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<SessionUser>>> {
    let user = service::update_profile(
        &state.pool,
        current.user.id,
        service::ProfileUpdate {
            display_name: input.display_name,
            avatar_url: input.avatar_url,
        },
    )
    .await?;

    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/account/settings
///
/// Shallow-merge a JSON object into the settings blob; returns the merged
/// settings.
pub async fn update_settings(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(patch): Json<serde_json::Value>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let settings = service::update_settings(&state.pool, current.user.id, patch).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// GET /api/account/sessions
///
/// All active sessions of the authenticated user. Token fingerprints are
/// never included.
pub async fn list_sessions(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<DataResponse<Vec<SessionOverview>>>> {
    let sessions = artellico_db::repositories::SessionRepo::list_active_for_user(
        &state.pool,
        current.user.id,
        Utc::now(),
    )
    .await?;

    Ok(Json(DataResponse { data: sessions }))
}

/// PUT /api/account/password
///
/// Change the password after verifying the current one. 204 on success,
/// 403 when the current password does not verify.
pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let changed = service::change_password(
        &state.pool,
        current.user.id,
        &input.current_password,
        &input.new_password,
    )
    .await?;

    if !changed {
        return Err(CoreError::Forbidden("Current password is incorrect".into()).into());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/account/logout-all
///
/// Revoke every session the user owns, including the current one, and clear
/// the cookie.
pub async fn logout_all(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    let removed = revoke_all_sessions(&state.pool, current.user.id).await?;
    tracing::info!(user_id = %current.user.id, removed, "All sessions revoked");

    Ok((jar.add(clear_session_cookie()), StatusCode::NO_CONTENT))
}

/// DELETE /api/account
///
/// Erase the account and all owned data. Irreversible. Clears the cookie.
pub async fn delete_account(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    service::delete_account(&state.pool, current.user.id).await?;

    Ok((jar.add(clear_session_cookie()), StatusCode::NO_CONTENT))
}

/// GET /api/subscription
///
/// Current tier, expiry, and whether it grants access right now.
pub async fn subscription(current: CurrentUser) -> Json<DataResponse<SubscriptionResponse>> {
    let SessionUser {
        subscription_tier,
        subscription_expires_at,
        ..
    } = current.user;

    let valid = subscription_tier.grants_access(subscription_expires_at, Utc::now());

    Json(DataResponse {
        data: SubscriptionResponse {
            tier: subscription_tier,
            expires_at: subscription_expires_at,
            valid,
        },
    })
}
