/// Role model
///
/// A role belongs to exactly one organization, optionally scoped to one
/// application, and grants a set of permission names via the
/// `role_permissions` junction. Users acquire roles through the `user_roles`
/// junction; a user's effective permission set is the union over their
/// non-deleted roles (see `crate::auth::permissions::resolve`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     organization_id UUID NOT NULL REFERENCES organizations(id),
///     application_id UUID REFERENCES applications(id),
///     deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE role_permissions (
///     role_id UUID NOT NULL REFERENCES roles(id),
///     permission_name TEXT NOT NULL REFERENCES permissions(name),
///     PRIMARY KEY (role_id, permission_name)
/// );
///
/// CREATE TABLE user_roles (
///     user_id UUID NOT NULL REFERENCES users(id),
///     role_id UUID NOT NULL REFERENCES roles(id),
///     PRIMARY KEY (user_id, role_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,

    /// Owning organization (required; every role is organization-scoped)
    pub organization_id: Uuid,

    /// Optional application scope
    pub application_id: Option<Uuid>,

    /// Soft-delete flag
    pub deleted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub organization_id: Uuid,
    pub application_id: Option<Uuid>,
}

/// A role as loaded for permission resolution: the role row plus its granted
/// permission names, fetched in one shot by the roles repository.
#[derive(Debug, Clone)]
pub struct LoadedRole {
    pub role_id: Uuid,
    pub deleted: bool,
    pub permission_names: Vec<String>,
}

/// `user_roles` junction row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role_id: Uuid,
}
