//! Integration tests for the request gate: route protection, entitlement
//! enforcement, redirects, security headers, and cascade deletion.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{
    body_json, build_test_app, delete_with_cookie, get, get_with_cookie, post_with_cookie,
    session_cookie_value,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Anonymous access
// ---------------------------------------------------------------------------

/// Public paths are reachable without a session.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_public_paths_open(pool: PgPool) {
    for path in ["/", "/auth", "/health"] {
        let response = get(build_test_app(pool.clone()), path).await;
        assert_eq!(response.status(), StatusCode::OK, "path {path}");
    }
}

/// Anonymous API requests get a 401 JSON body, not a redirect.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_anonymous_api_gets_401_json(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/notes").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Unauthorized");
    assert_eq!(json["message"], "Authentication required");
}

/// Anonymous page requests are redirected to /auth with a return URL.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_anonymous_page_redirects_with_return_url(pool: PgPool) {
    let response = get(build_test_app(pool.clone()), "/settings").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/auth?returnUrl=%2Fsettings");

    let response = get(build_test_app(pool), "/editor").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/auth?returnUrl=%2Feditor");
}

/// Prefix matching respects path-segment boundaries: a path that merely
/// starts with a protected prefix string is still public.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_lookalike_prefix_not_protected(pool: PgPool) {
    // Unrouted but public: falls through the gate to the router's 404.
    let response = get(build_test_app(pool), "/editorial").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Security headers
// ---------------------------------------------------------------------------

/// Baseline security headers appear on every response, including the gate's
/// own early rejections.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_security_headers_everywhere(pool: PgPool) {
    let public = get(build_test_app(pool.clone()), "/").await;
    let rejected = get(build_test_app(pool), "/api/notes").await;

    for response in [public, rejected] {
        let headers = response.headers();
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-xss-protection"], "1; mode=block");
        assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    }
}

// ---------------------------------------------------------------------------
// Auth-only area
// ---------------------------------------------------------------------------

/// A signed-in, entitled user visiting /auth is bounced to the home page.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_signed_in_user_bounced_from_auth(pool: PgPool) {
    let token = common::register_and_login(&pool, "bounced").await;

    let response = get_with_cookie(build_test_app(pool), "/auth", &token).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/");
}

/// Logout stays reachable for signed-in users despite the /auth bounce.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_reachable_while_signed_in(pool: PgPool) {
    let token = common::register_and_login(&pool, "escapee").await;

    let response = post_with_cookie(build_test_app(pool), "/auth/logout", &token).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/auth");
}

/// An under-entitled user is NOT bounced from /auth, so the expired-
/// subscription landing page cannot redirect-loop.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_under_entitled_user_can_reach_auth(pool: PgPool) {
    let token = common::register_and_login(&pool, "lapsed_auth").await;
    common::set_subscription(
        &pool,
        "lapsed_auth",
        "pro",
        Some(Utc::now() - chrono::Duration::days(1)),
    )
    .await;

    let response = get_with_cookie(build_test_app(pool), "/auth", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Entitlement enforcement
// ---------------------------------------------------------------------------

/// A lapsed paid tier loses gated paths but keeps account management.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_lapsed_subscription_matrix(pool: PgPool) {
    let token = common::register_and_login(&pool, "lapsed").await;
    common::set_subscription(
        &pool,
        "lapsed",
        "pro",
        Some(Utc::now() - chrono::Duration::days(1)),
    )
    .await;

    // Gated API path: 403 JSON.
    let response = get_with_cookie(build_test_app(pool.clone()), "/api/notes", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Forbidden");

    // Gated page: redirect to the expired-subscription landing.
    let response = get_with_cookie(build_test_app(pool.clone()), "/editor", &token).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()["location"],
        "/auth?error=subscription_expired"
    );

    // Settings page requires auth only, not entitlement.
    let response = get_with_cookie(build_test_app(pool.clone()), "/settings", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Account and subscription endpoints stay reachable.
    let response = get_with_cookie(build_test_app(pool.clone()), "/api/account", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_with_cookie(build_test_app(pool), "/api/subscription", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// An active paid tier and the free/lifetime tiers pass the gate.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_valid_tiers_pass_gate(pool: PgPool) {
    let token = common::register_and_login(&pool, "tiers").await;

    // Free (default): valid with no expiry.
    let response = get_with_cookie(build_test_app(pool.clone()), "/api/notes", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Paid with future expiry: valid.
    common::set_subscription(
        &pool,
        "tiers",
        "pro",
        Some(Utc::now() + chrono::Duration::days(30)),
    )
    .await;
    let response = get_with_cookie(build_test_app(pool.clone()), "/api/notes", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Lifetime: valid regardless of expiry.
    common::set_subscription(&pool, "tiers", "lifetime", None).await;
    let response = get_with_cookie(build_test_app(pool), "/editor", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

/// Full journey: register, log in, reach a protected page, get bounced
/// without the cookie, log out, and find the old cookie dead.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_full_session_journey(pool: PgPool) {
    let token = common::register_and_login(&pool, "journey").await;

    let response = get_with_cookie(build_test_app(pool.clone()), "/settings", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(build_test_app(pool.clone()), "/settings").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/auth?returnUrl=%2Fsettings");

    let response = post_with_cookie(build_test_app(pool.clone()), "/auth/logout", &token).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(session_cookie_value(&response).as_deref(), Some(""));

    // Revoked cookie: back to the sign-in redirect, and the stale cookie is
    // cleared again.
    let response = get_with_cookie(build_test_app(pool), "/settings", &token).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/auth?returnUrl=%2Fsettings");
    assert_eq!(session_cookie_value(&response).as_deref(), Some(""));
}

/// Account erasure cascades: sessions and notes disappear with the user.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_account_erasure_cascades(pool: PgPool) {
    let token_a = common::register_and_login(&pool, "cascade").await;
    let _token_b = common::login(&pool, "cascade").await;

    let user_id: uuid::Uuid =
        sqlx::query_scalar("SELECT id FROM users WHERE username = 'cascade'")
            .fetch_one(&pool)
            .await
            .unwrap();

    artellico_db::repositories::NoteRepo::create(&pool, user_id, "Draft")
        .await
        .unwrap();

    let response = delete_with_cookie(build_test_app(pool.clone()), "/api/account", &token_a).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for table in ["users", "sessions", "notes"] {
        let query = format!(
            "SELECT COUNT(*) FROM {table} WHERE {} = $1",
            if table == "users" { "id" } else { "user_id" }
        );
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "table {table} should be empty for the user");
    }
}
