//! Repository for the `sessions` table.
//!
//! Pure persistence, no policy: expiry checks and refresh decisions live in
//! the session lifecycle layer. A revoked or expired session is simply a
//! deleted row -- there is no tombstone state.

use artellico_core::types::{Id, Timestamp};
use sqlx::PgPool;

use crate::models::session::{CreateSession, Session, SessionIdentity, SessionOverview};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, expires_at, user_agent, ip_address, created_at";

/// Provides CRUD operations for sessions, keyed by token fingerprint.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, token_hash, expires_at, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Find a session by fingerprint joined with its owning user's safe
    /// fields. This is the single query behind request validation.
    ///
    /// Returns the row even when expired; the lifecycle layer owns the
    /// expiry check so it can lazily delete stale rows.
    pub async fn find_identity_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<SessionIdentity>, sqlx::Error> {
        sqlx::query_as::<_, SessionIdentity>(
            "SELECT
                u.id AS user_id,
                u.email,
                u.username,
                u.display_name,
                u.avatar_url,
                u.role,
                u.subscription_tier,
                u.subscription_expires_at,
                s.expires_at
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Extend a session's expiry. Extending an absent session is a no-op.
    pub async fn update_expiry(
        pool: &PgPool,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sessions SET expires_at = $2 WHERE token_hash = $1")
            .bind(token_hash)
            .bind(expires_at)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete a session by fingerprint. Idempotent: deleting an absent
    /// session is not an error.
    pub async fn delete_by_token_hash(pool: &PgPool, token_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete all sessions for a user ("logout everywhere"). Returns the
    /// count of deleted rows.
    pub async fn delete_all_for_user(pool: &PgPool, user_id: Id) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete all sessions that expired before `now`. Returns the count of
    /// deleted rows.
    pub async fn delete_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// List a user's live sessions, newest first. Token hashes are not part
    /// of the projection.
    pub async fn list_active_for_user(
        pool: &PgPool,
        user_id: Id,
        now: Timestamp,
    ) -> Result<Vec<SessionOverview>, sqlx::Error> {
        sqlx::query_as::<_, SessionOverview>(
            "SELECT id, user_id, expires_at, user_agent, ip_address, created_at
             FROM sessions
             WHERE user_id = $1 AND expires_at > $2
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(pool)
        .await
    }
}
