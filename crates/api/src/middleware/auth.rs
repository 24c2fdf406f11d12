//! Authenticated-identity extractor for Axum handlers.

use artellico_core::error::CoreError;
use artellico_core::types::Timestamp;
use artellico_db::models::user::SessionUser;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Identity attached to the request by the gate after successful session
/// validation. Rebuilt fresh on every request, never persisted.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: SessionUser,
    pub expires_at: Timestamp,
}

/// Authenticated user extracted from the request extensions.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(current: CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %current.user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// The gate already rejects unauthenticated requests to protected paths, so
/// the rejection here only fires if a handler is mounted on a path the route
/// policy does not cover.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: SessionUser,
    /// Expiry of the session that authenticated this request.
    pub session_expires_at: Timestamp,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<AuthSession>().cloned().ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Authentication required".into()))
        })?;

        Ok(CurrentUser {
            user: session.user,
            session_expires_at: session.expires_at,
        })
    }
}
