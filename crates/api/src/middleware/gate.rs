//! Per-request session validation and route protection.
//!
//! Every request passes through [`gate`]: it resolves the session cookie to
//! an identity, enforces the route-class policy, and stamps baseline
//! security headers on the way out. Cookie changes are expressed as an
//! explicit [`CookieDirective`] applied to the response, never by mutating
//! request state mid-flight.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde_json::json;

use crate::error::AppError;
use crate::middleware::auth::AuthSession;
use crate::session::{clear_session_cookie, refresh_if_needed, validate_session, SESSION_COOKIE_NAME};
use crate::state::AppState;

/// Path prefixes that require an authenticated identity.
const PROTECTED_PREFIXES: &[&str] = &["/editor", "/settings", "/literatur", "/api"];

/// Protected prefixes that additionally require a valid entitlement.
const ENTITLEMENT_GATED_PREFIXES: &[&str] = &["/editor", "/literatur", "/api"];

/// Entitlement-gated sub-paths that stay reachable for under-entitled users:
/// account and subscription management must work for someone whose
/// subscription just lapsed. Add routes here, not ad hoc checks in handlers.
const ENTITLEMENT_EXEMPT_PREFIXES: &[&str] = &["/api/account", "/api/subscription"];

/// Auth-area prefix: authenticated (and entitled) users are bounced to `/`.
const AUTH_PREFIX: &str = "/auth";

/// Auth sub-paths exempt from the bounce -- logout must stay reachable for
/// logged-in users.
const AUTH_EXEMPT_PREFIXES: &[&str] = &["/auth/logout"];

/// Access class of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Anonymous browsing allowed.
    Public,
    /// Login/registration area; valid-entitlement users are redirected away.
    AuthOnly,
    /// Requires an authenticated identity; optionally a valid entitlement.
    Protected { entitlement_gated: bool },
}

/// Prefix match on path-segment boundaries: `/editor` matches `/editor` and
/// `/editor/new` but not `/editorial`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
}

fn matches_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| matches_prefix(path, p))
}

/// Classify a request path against the route policy.
pub fn classify(path: &str) -> RouteClass {
    if matches_prefix(path, AUTH_PREFIX) {
        if matches_any(path, AUTH_EXEMPT_PREFIXES) {
            return RouteClass::Public;
        }
        return RouteClass::AuthOnly;
    }

    if matches_any(path, PROTECTED_PREFIXES) {
        let entitlement_gated = matches_any(path, ENTITLEMENT_GATED_PREFIXES)
            && !matches_any(path, ENTITLEMENT_EXEMPT_PREFIXES);
        return RouteClass::Protected { entitlement_gated };
    }

    RouteClass::Public
}

/// What the response-writing pass should do with the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieDirective {
    None,
    /// Clear a stale or invalid cookie (best-effort cleanup).
    Clear,
}

/// Main request gate. Applied as `axum::middleware::from_fn_with_state`.
pub async fn gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string());

    let mut directive = CookieDirective::None;
    let mut auth: Option<AuthSession> = None;

    if let Some(token) = token.as_deref() {
        match validate_session(&state.pool, token).await {
            Ok(Some(validated)) => {
                // Sliding-window renewal on active use.
                if let Err(e) = refresh_if_needed(&state.pool, token, validated.expires_at).await {
                    return finalize(AppError::Database(e).into_response(), directive);
                }
                auth = Some(AuthSession {
                    user: validated.user,
                    expires_at: validated.expires_at,
                });
            }
            // Unknown, malformed, or expired token: anonymous, and clean up
            // the useless cookie.
            Ok(None) => directive = CookieDirective::Clear,
            // Store unreachable: fail the request loudly rather than
            // silently downgrading an authenticated user to anonymous.
            Err(e) => return finalize(AppError::Database(e).into_response(), directive),
        }
    }

    let path = request.uri().path().to_string();
    let is_api = matches_prefix(&path, "/api");
    let now = Utc::now();

    match classify(&path) {
        RouteClass::AuthOnly => {
            if let Some(session) = &auth {
                // Under-entitled users must be able to land on
                // /auth?error=subscription_expired without a redirect loop.
                if session.user.has_valid_entitlement(now) {
                    return finalize(redirect("/"), directive);
                }
            }
        }
        RouteClass::Protected { entitlement_gated } => match &auth {
            None => {
                let response = if is_api {
                    unauthorized()
                } else {
                    redirect(&format!(
                        "/auth?returnUrl={}",
                        urlencoding::encode(&path)
                    ))
                };
                return finalize(response, directive);
            }
            Some(session) if entitlement_gated && !session.user.has_valid_entitlement(now) => {
                let response = if is_api {
                    forbidden()
                } else {
                    redirect("/auth?error=subscription_expired")
                };
                return finalize(response, directive);
            }
            Some(_) => {}
        },
        RouteClass::Public => {}
    }

    if let Some(session) = auth {
        request.extensions_mut().insert(session);
    }

    let response = next.run(request).await;
    finalize(response, directive)
}

fn redirect(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "Unauthorized",
            "message": "Authentication required",
        })),
    )
        .into_response()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "Forbidden",
            "message": "A valid subscription is required",
        })),
    )
        .into_response()
}

/// Apply the cookie directive and baseline security headers to the outgoing
/// response (gate-produced responses included).
fn finalize(mut response: Response, directive: CookieDirective) -> Response {
    if directive == CookieDirective::Clear {
        if let Ok(value) = HeaderValue::from_str(&clear_session_cookie().to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    apply_security_headers(response.headers_mut());
    response
}

/// Inject baseline security headers unless the handler already set them.
fn apply_security_headers(headers: &mut HeaderMap) {
    let defaults = [
        ("x-frame-options", "SAMEORIGIN"),
        ("x-content-type-options", "nosniff"),
        ("x-xss-protection", "1; mode=block"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
    ];
    for (name, value) in defaults {
        if !headers.contains_key(name) {
            headers.insert(
                header::HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
    }
}
