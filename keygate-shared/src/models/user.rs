/// User model
///
/// A user is the authenticated identity. Role membership (and through it the
/// effective permission set) is modelled by the `user_roles` junction; the
/// roles repository owns those queries.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     first_name VARCHAR(255) NOT NULL,
///     last_name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255),
///     disabled BOOLEAN NOT NULL DEFAULT FALSE,
///     deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account.
///
/// `password_hash` is nullable: externally-provisioned users (identity
/// provider accounts) have no local credential. It is an Argon2id PHC
/// string when present, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Primary email address (case-insensitive, unique among non-deleted users)
    pub email: String,

    /// Argon2id password hash; None for users without a local credential
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Administratively disabled; disabled users cannot log in
    pub disabled: bool,

    /// Soft-delete flag
    pub deleted: bool,

    /// Whether the email address has been verified
    pub email_verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether this user may authenticate at all.
    pub fn can_login(&self) -> bool {
        !self.disabled && !self.deleted && self.password_hash.is_some()
    }
}

/// Input for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password), or None
    pub password_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(disabled: bool, deleted: bool, hash: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: hash.map(str::to_string),
            disabled,
            deleted,
            email_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_can_login() {
        assert!(user(false, false, Some("$argon2id$...")).can_login());
        assert!(!user(true, false, Some("$argon2id$...")).can_login());
        assert!(!user(false, true, Some("$argon2id$...")).can_login());
        assert!(!user(false, false, None).can_login());
    }
}
