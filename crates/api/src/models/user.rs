//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clementine_core::{Email, Role, UserId};

/// A registered account. The password hash never leaves the db layer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name given at registration.
    pub name: String,
    /// User's email address (unique, lowercased).
    pub email: Email,
    /// Account role.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The request-scoped identity decoded from a bearer token.
///
/// Every authenticated operation receives one of these explicitly -
/// there is no ambient "current user".
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Email,
    pub role: Role,
}

impl Identity {
    /// Whether this identity may act on admin-only operations.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
