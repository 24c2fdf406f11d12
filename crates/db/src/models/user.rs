//! User entity model and DTOs.

use artellico_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user's authorization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
    Superadmin,
}

/// A user's subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Team,
    Enterprise,
    Lifetime,
}

impl SubscriptionTier {
    /// Whether this tier currently grants access to gated functionality.
    ///
    /// `lifetime` never expires and `free` is always valid (feature-limited
    /// elsewhere). Paid tiers require a future expiry timestamp.
    pub fn grants_access(self, expires_at: Option<Timestamp>, now: Timestamp) -> bool {
        match self {
            SubscriptionTier::Lifetime | SubscriptionTier::Free => true,
            SubscriptionTier::Pro | SubscriptionTier::Team | SubscriptionTier::Enterprise => {
                expires_at.is_some_and(|at| at > now)
            }
        }
    }
}

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`SessionUser`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub subscription_tier: SubscriptionTier,
    pub subscription_expires_at: Option<Timestamp>,
    pub settings: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The safe projection of this row.
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            role: self.role,
            subscription_tier: self.subscription_tier,
            subscription_expires_at: self.subscription_expires_at,
        }
    }
}

/// Safe user representation attached to requests and API responses
/// (no password hash, no settings blob).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionUser {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub subscription_tier: SubscriptionTier,
    pub subscription_expires_at: Option<Timestamp>,
}

impl SessionUser {
    /// Whether the user's subscription currently grants gated access.
    pub fn has_valid_entitlement(&self, now: Timestamp) -> bool {
        self.subscription_tier
            .grants_access(self.subscription_expires_at, now)
    }
}

/// DTO for creating a new user. Email and username must already be
/// lower-cased by the caller.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub settings: serde_json::Value,
}
