/// Permission model
///
/// Permissions are keyed by their globally unique name; there is no surrogate
/// id. `is_system_admin` marks a permission as exempt from organization
/// scoping.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE permissions (
///     name TEXT PRIMARY KEY,
///     display_name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     is_system_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     edited_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Permission {
    /// Globally unique name; this is the primary key
    pub name: String,

    pub display_name: String,
    pub description: String,

    /// Implicitly exempt from organization scoping
    pub is_system_admin: bool,

    /// Soft-delete flag
    pub deleted: bool,

    pub created_at: DateTime<Utc>,
    pub edited_at: DateTime<Utc>,
}

/// Input for creating a permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub is_system_admin: bool,
}
