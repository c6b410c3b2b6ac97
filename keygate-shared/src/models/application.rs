/// Application model
///
/// A first- or third-party client registered with the platform. Applications
/// authenticate service-to-service with their secret key, own permissions
/// meaningful only within their scope, and are enabled per organization via
/// the `organization_applications` junction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE applications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     api_url VARCHAR(512) NOT NULL,
///     client_url VARCHAR(512) NOT NULL,
///     secret_key VARCHAR(255) NOT NULL,
///     deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE organization_applications (
///     organization_id UUID NOT NULL REFERENCES organizations(id),
///     application_id UUID NOT NULL REFERENCES applications(id),
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     PRIMARY KEY (organization_id, application_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: Uuid,
    pub name: String,
    pub api_url: String,
    pub client_url: String,

    /// Service-to-service credential; never exposed in list responses
    #[serde(skip_serializing)]
    pub secret_key: String,

    /// Soft-delete flag
    pub deleted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplication {
    pub name: String,
    pub api_url: String,
    pub client_url: String,
    pub secret_key: String,
}

/// `organization_applications` junction row (per-organization enablement).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrganizationApplication {
    pub organization_id: Uuid,
    pub application_id: Uuid,
    pub active: bool,
}
