/// Secondary contact models: user emails and user phones.
///
/// A user's primary email lives on the users row; additional addresses and
/// phone numbers are owned rows here.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_emails (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     email VARCHAR(255) NOT NULL,
///     deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE user_phones (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     phone_number VARCHAR(32) NOT NULL,
///     label VARCHAR(64),
///     deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserEmail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserPhone {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone_number: String,
    pub label: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}
