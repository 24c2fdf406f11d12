//! Session lifecycle: creation, validation, sliding refresh, revocation,
//! and expired-row sweep.
//!
//! A session moves through `absent -> active -> (refreshed)* -> removed`.
//! There is no stored "expired" or "revoked" state: absence of a live row is
//! the terminal state, and validation lazily deletes rows it finds expired.
//!
//! The raw token exists in exactly two places: the value returned by
//! [`create_session`] (to be set as a cookie) and the client's cookie jar.
//! Everything server-side works on the SHA-256 fingerprint.

use artellico_core::types::{Id, Timestamp};
use artellico_db::models::session::CreateSession;
use artellico_db::models::user::SessionUser;
use artellico_db::repositories::SessionRepo;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use sqlx::PgPool;

use crate::auth::token::{fingerprint, generate_token};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "artellico_session";

/// Absolute session lifetime.
pub const SESSION_DURATION_DAYS: i64 = 30;

/// Sessions closer than this to expiry get extended on use.
pub const REFRESH_WINDOW_DAYS: i64 = 7;

fn session_duration() -> chrono::Duration {
    chrono::Duration::days(SESSION_DURATION_DAYS)
}

fn refresh_window() -> chrono::Duration {
    chrono::Duration::days(REFRESH_WINDOW_DAYS)
}

/// Optional client metadata recorded with a session.
#[derive(Debug, Clone, Default)]
pub struct SessionMetadata {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Result of creating a session. `token` is the raw token -- hand it to the
/// client cookie and drop it.
#[derive(Debug)]
pub struct NewSession {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Result of validating a token: the resolved user plus the session expiry.
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub user: SessionUser,
    pub expires_at: Timestamp,
}

/// Create a new session for a user.
pub async fn create_session(
    pool: &PgPool,
    user_id: Id,
    meta: SessionMetadata,
) -> Result<NewSession, sqlx::Error> {
    let token = generate_token();
    let expires_at = Utc::now() + session_duration();

    let input = CreateSession {
        user_id,
        token_hash: fingerprint(&token),
        expires_at,
        user_agent: meta.user_agent,
        ip_address: meta.ip_address,
    };
    SessionRepo::create(pool, &input).await?;

    Ok(NewSession { token, expires_at })
}

/// Validate a session token.
///
/// Returns `Ok(None)` for unknown, malformed, and expired tokens alike --
/// the caller cannot distinguish them, by design. Expired rows are deleted
/// on the way out (lazy expiry). Store errors propagate so the caller can
/// fail the request instead of silently treating an outage as
/// "unauthenticated".
///
/// This is a pure read (plus the opportunistic delete); it never refreshes.
pub async fn validate_session(
    pool: &PgPool,
    token: &str,
) -> Result<Option<ValidatedSession>, sqlx::Error> {
    let token_hash = fingerprint(token);

    let Some(identity) = SessionRepo::find_identity_by_token_hash(pool, &token_hash).await? else {
        return Ok(None);
    };

    if identity.expires_at < Utc::now() {
        SessionRepo::delete_by_token_hash(pool, &token_hash).await?;
        return Ok(None);
    }

    Ok(Some(ValidatedSession {
        user: SessionUser {
            id: identity.user_id,
            email: identity.email,
            username: identity.username,
            display_name: identity.display_name,
            avatar_url: identity.avatar_url,
            role: identity.role,
            subscription_tier: identity.subscription_tier,
            subscription_expires_at: identity.subscription_expires_at,
        },
        expires_at: identity.expires_at,
    }))
}

/// Sliding-window renewal: extend the session to `now + SESSION_DURATION`
/// iff it is within [`REFRESH_WINDOW_DAYS`] of expiry. Returns whether an
/// extension was written.
///
/// Two concurrent requests may both land inside the window and both write;
/// that is harmless -- both set the expiry to the same target value modulo
/// request-time skew.
pub async fn refresh_if_needed(
    pool: &PgPool,
    token: &str,
    expires_at: Timestamp,
) -> Result<bool, sqlx::Error> {
    let now = Utc::now();
    if expires_at - now >= refresh_window() {
        return Ok(false);
    }
    SessionRepo::update_expiry(pool, &fingerprint(token), now + session_duration()).await?;
    Ok(true)
}

/// Revoke a session (logout). Idempotent: revoking an absent session is
/// not an error.
pub async fn revoke_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    SessionRepo::delete_by_token_hash(pool, &fingerprint(token)).await
}

/// Revoke every session a user owns ("logout everywhere"). Returns the
/// number of sessions removed.
pub async fn revoke_all_sessions(pool: &PgPool, user_id: Id) -> Result<u64, sqlx::Error> {
    SessionRepo::delete_all_for_user(pool, user_id).await
}

/// Remove all expired session rows. Intended to run on a fixed interval
/// from the background sweep task, not inline on requests.
pub async fn sweep_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    SessionRepo::delete_expired(pool, Utc::now()).await
}

// ---------------------------------------------------------------------------
// Cookie helpers
// ---------------------------------------------------------------------------

/// Build the session cookie carrying the raw token.
///
/// HTTP-only, `SameSite=Lax`, path `/`, max-age equal to the session
/// duration; `Secure` in production.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .max_age(time::Duration::days(SESSION_DURATION_DAYS))
        .build()
}

/// Build a removal cookie that clears the session cookie on the client.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("deadbeef".into(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "deadbeef");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::days(SESSION_DURATION_DAYS))
        );
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
