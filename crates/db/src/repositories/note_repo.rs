//! Repository for the `notes` table. Only the operations the API surface
//! needs; full content CRUD is out of scope here.

use artellico_core::types::Id;
use sqlx::PgPool;

use crate::models::note::{Note, NoteSummary};

/// Provides read access to user-owned notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a note with the given title, returning the created row.
    pub async fn create(pool: &PgPool, user_id: Id, title: &str) -> Result<Note, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            "INSERT INTO notes (user_id, title)
             VALUES ($1, $2)
             RETURNING id, user_id, title, content, created_at, updated_at",
        )
        .bind(user_id)
        .bind(title)
        .fetch_one(pool)
        .await
    }

    /// List a user's notes, most recently updated first.
    pub async fn list_for_user(pool: &PgPool, user_id: Id) -> Result<Vec<NoteSummary>, sqlx::Error> {
        sqlx::query_as::<_, NoteSummary>(
            "SELECT id, title, updated_at
             FROM notes
             WHERE user_id = $1
             ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
