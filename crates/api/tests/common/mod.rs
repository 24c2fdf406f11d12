use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use artellico_api::config::ServerConfig;
use artellico_api::session::SESSION_COOKIE_NAME;
use artellico_api::state::AppState;
use artellico_api::{middleware, routes};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and insecure cookies so assertions do not depend on TLS.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        secure_cookies: false,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same stack production uses -- in particular the request
/// gate, which owns session validation and route protection.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let state = AppState {
        pool,
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .merge(routes::pages::router())
        .nest("/auth", routes::auth::router())
        .nest("/api", routes::api_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::gate::gate,
        ))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a single request through the app. `body` of `None` sends an empty
/// body; `cookie` of `Some(token)` attaches the session cookie.
pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = cookie {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };

    app.oneshot(request).await.expect("request should not fail")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    request(app, Method::GET, uri, None, None).await
}

pub async fn get_with_cookie(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_with_cookie(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    request(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn post_with_cookie(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::POST, uri, None, Some(token)).await
}

pub async fn put_json_with_cookie(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    request(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn delete_with_cookie(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::DELETE, uri, None, Some(token)).await
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Extract the session token from a `Set-Cookie` header, if present.
/// Returns `Some("")` when the response clears the cookie.
pub fn session_cookie_value(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| {
            let (name_value, _) = raw.split_once(';').unwrap_or((raw, ""));
            let (name, value) = name_value.split_once('=')?;
            (name == SESSION_COOKIE_NAME).then(|| value.to_string())
        })
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

/// Default password used by the fixtures.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Register a user through the API and return the login session token.
pub async fn register_and_login(pool: &PgPool, username: &str) -> String {
    let register_body = serde_json::json!({
        "email": format!("{username}@test.com"),
        "username": username,
        "password": TEST_PASSWORD,
    });
    let response = post_json(build_test_app(pool.clone()), "/auth/register", register_body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    login(pool, username).await
}

/// Log an existing user in and return the session token from the cookie.
pub async fn login(pool: &PgPool, identifier: &str) -> String {
    let body = serde_json::json!({ "identifier": identifier, "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    session_cookie_value(&response).expect("login should set the session cookie")
}

/// Set a user's subscription directly in the database.
pub async fn set_subscription(
    pool: &PgPool,
    username: &str,
    tier: &str,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
) {
    sqlx::query(
        "UPDATE users SET subscription_tier = $1::subscription_tier, \
         subscription_expires_at = $2 WHERE username = $3",
    )
    .bind(tier)
    .bind(expires_at)
    .bind(username)
    .execute(pool)
    .await
    .expect("subscription update should succeed");
}
