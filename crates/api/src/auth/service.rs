//! User account operations: registration, authentication, login/logout,
//! password change, and account erasure.
//!
//! The scrypt KDF is deliberately slow, so every hash/verify call here is
//! pushed onto the blocking thread pool via `spawn_blocking` instead of
//! stalling the async executor.

use artellico_core::error::CoreError;
use artellico_core::types::{Id, Timestamp};
use artellico_db::models::user::{CreateUser, SessionUser, User};
use artellico_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::session::{create_session, revoke_session, SessionMetadata};

/// Minimum password length for registration and password changes.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Syntactically valid stored hash that matches no real password. Verified
/// against when the identifier is unknown, so the KDF cost is paid on both
/// failure paths and response timing does not reveal whether an account
/// exists.
const DUMMY_HASH: &str = "00000000000000000000000000000000:\
    0000000000000000000000000000000000000000000000000000000000000000\
    0000000000000000000000000000000000000000000000000000000000000000";

/// Input for [`register`].
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Successful login: the resolved user plus the raw session token. The token
/// belongs in the client cookie and nowhere else.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: SessionUser,
    pub token: String,
    pub expires_at: Timestamp,
}

/// Default settings blob for new accounts.
fn default_settings() -> serde_json::Value {
    json!({
        "cacheLimit": 100,
        "enableGeolocation": false,
        "defaultCitationFormat": "apa",
        "autoSaveInterval": 30,
        "editorFontSize": 18,
        "readingModeEnabled": false,
        "apiKeys": {},
    })
}

async fn hash_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalError(format!("Hashing task failed: {e}")))?
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

async fn verify_blocking(password: String, stored: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AppError::InternalError(format!("Verification task failed: {e}")))
}

/// Create a new user account.
///
/// Email and username are stored lower-cased, so uniqueness is
/// case-insensitive. The conflict message deliberately does not say which
/// field collided.
pub async fn register(pool: &PgPool, input: RegisterInput) -> AppResult<SessionUser> {
    if input.password.len() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ))
        .into());
    }

    if UserRepo::exists_by_email_or_username(pool, &input.email, &input.username).await? {
        return Err(CoreError::Conflict(
            "An account with this email or username already exists".to_string(),
        )
        .into());
    }

    let password_hash = hash_blocking(input.password).await?;

    let create = CreateUser {
        email: input.email.to_lowercase(),
        username: input.username.to_lowercase(),
        password_hash,
        display_name: input
            .display_name
            .or_else(|| Some(input.username.clone())),
        settings: default_settings(),
    };

    // A concurrent registration can still hit the unique constraint; the
    // error classifier maps that to the same generic 409.
    let user = UserRepo::create(pool, &create).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok(user.to_session_user())
}

/// Authenticate with an email or username plus password.
///
/// Returns `Ok(None)` both when the identifier is unknown and when the
/// password is wrong -- one signal, no account enumeration. The full row is
/// returned (hash included) for internal composition only; it must not cross
/// the service boundary.
pub async fn authenticate(
    pool: &PgPool,
    identifier: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let Some(user) = UserRepo::find_by_identifier(pool, identifier).await? else {
        // Burn the same KDF cost as a real verification; see DUMMY_HASH.
        let _ = verify_blocking(password.to_string(), DUMMY_HASH.to_string()).await?;
        return Ok(None);
    };

    if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
        return Ok(None);
    }

    Ok(Some(user))
}

/// Authenticate and open a session.
pub async fn login(
    pool: &PgPool,
    identifier: &str,
    password: &str,
    meta: SessionMetadata,
) -> AppResult<Option<LoginOutcome>> {
    let Some(user) = authenticate(pool, identifier, password).await? else {
        return Ok(None);
    };

    let session = create_session(pool, user.id, meta).await?;
    tracing::info!(user_id = %user.id, "Login");

    Ok(Some(LoginOutcome {
        user: user.to_session_user(),
        token: session.token,
        expires_at: session.expires_at,
    }))
}

/// Revoke the session behind a token.
pub async fn logout(pool: &PgPool, token: &str) -> AppResult<()> {
    revoke_session(pool, token).await?;
    Ok(())
}

/// Input for [`update_profile`]. `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Update a user's profile fields.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Id,
    update: ProfileUpdate,
) -> AppResult<SessionUser> {
    let user = UserRepo::update_profile(
        pool,
        user_id,
        update.display_name.as_deref(),
        update.avatar_url.as_deref(),
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "user",
        id: user_id,
    })?;

    Ok(user.to_session_user())
}

/// Shallow-merge a JSON patch into the user's settings blob and return the
/// merged result. Top-level keys overwrite; unknown keys are stored as-is
/// (the settings blob is client-defined).
pub async fn update_settings(
    pool: &PgPool,
    user_id: Id,
    patch: serde_json::Value,
) -> AppResult<serde_json::Value> {
    if !patch.is_object() {
        return Err(CoreError::Validation("Settings patch must be a JSON object".into()).into());
    }

    let settings = UserRepo::update_settings(pool, user_id, &patch)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "user",
            id: user_id,
        })?;

    Ok(settings)
}

/// Change a user's password after verifying the current one.
///
/// Returns `Ok(false)` without mutating anything when the current password
/// does not verify (or the user is gone).
pub async fn change_password(
    pool: &PgPool,
    user_id: Id,
    current_password: &str,
    new_password: &str,
) -> AppResult<bool> {
    if new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ))
        .into());
    }

    let Some(user) = UserRepo::find_by_id(pool, user_id).await? else {
        return Ok(false);
    };

    if !verify_blocking(current_password.to_string(), user.password_hash).await? {
        return Ok(false);
    }

    let new_hash = hash_blocking(new_password.to_string()).await?;
    UserRepo::update_password(pool, user_id, &new_hash).await?;
    tracing::info!(user_id = %user_id, "Password changed");

    Ok(true)
}

/// Erase a user account and everything it owns.
///
/// Runs as a single transaction; sessions and content fall to the schema's
/// cascading deletes. Irreversible.
pub async fn delete_account(pool: &PgPool, user_id: Id) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    UserRepo::delete(&mut tx, user_id).await?;
    tx.commit().await?;
    tracing::info!(user_id = %user_id, "Account deleted");
    Ok(())
}
