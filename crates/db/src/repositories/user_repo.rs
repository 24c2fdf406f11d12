//! Repository for the `users` table.

use artellico_core::types::Id;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, username, password_hash, display_name, avatar_url, \
                        role, subscription_tier, subscription_expires_at, settings, \
                        created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, username, password_hash, display_name, settings)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .bind(&input.settings)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: Id) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user whose email or username matches `identifier`
    /// case-insensitively. Rows store these fields lower-cased, so a single
    /// lower-cased comparison value covers both.
    pub async fn find_by_identifier(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1 OR username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(identifier.to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// Check whether a user with the given email or username already exists
    /// (both compared lower-cased).
    pub async fn exists_by_email_or_username(
        pool: &PgPool,
        email: &str,
        username: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(Id,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1 OR username = $2")
                .bind(email.to_lowercase())
                .bind(username.to_lowercase())
                .fetch_optional(pool)
                .await?;
        Ok(row.is_some())
    }

    /// Partial profile update: fields passed as `None` keep their current
    /// value. Returns the updated row, or `None` when the user is gone.
    pub async fn update_profile(
        pool: &PgPool,
        id: Id,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users
             SET display_name = COALESCE($2, display_name),
                 avatar_url = COALESCE($3, avatar_url),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(display_name)
            .bind(avatar_url)
            .fetch_optional(pool)
            .await
    }

    /// Shallow-merge a JSON patch into the user's settings blob (top-level
    /// keys in `patch` overwrite, everything else is kept). Returns the
    /// merged blob, or `None` when the user is gone.
    pub async fn update_settings(
        pool: &PgPool,
        id: Id,
        patch: &serde_json::Value,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE users
             SET settings = settings || $2::jsonb, updated_at = NOW()
             WHERE id = $1
             RETURNING settings",
        )
        .bind(id)
        .bind(patch)
        .fetch_optional(pool)
        .await
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: Id,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user inside the given transaction. Sessions and owned
    /// content are removed by `ON DELETE CASCADE`; the account erasure path
    /// must be all-or-nothing, hence the explicit transaction handle.
    pub async fn delete(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Id,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
