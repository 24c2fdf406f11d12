//! Session model and DTOs.

use artellico_core::types::{Id, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::user::{SubscriptionTier, UserRole};

/// A session row from the `sessions` table.
///
/// `token_hash` is the one-way fingerprint of the client's token; the raw
/// token exists only in the client cookie.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Id,
    pub user_id: Id,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub user_id: Id,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Join row produced by session validation: the owning user's safe fields
/// plus the session expiry. Never persisted, rebuilt on every request.
#[derive(Debug, Clone, FromRow)]
pub struct SessionIdentity {
    pub user_id: Id,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub subscription_tier: SubscriptionTier,
    pub subscription_expires_at: Option<Timestamp>,
    pub expires_at: Timestamp,
}

/// Active-session view for the account settings page. The token hash is
/// deliberately absent from the projection.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionOverview {
    pub id: Id,
    pub user_id: Id,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}
