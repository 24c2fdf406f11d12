//! Minimal note model. Notes are user-owned content; only the listing needed
//! by the API surface is modeled here.

use artellico_core::types::{Id, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A note row from the `notes` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub content: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Listing projection (no content body).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NoteSummary {
    pub id: Id,
    pub title: String,
    pub updated_at: Timestamp,
}
