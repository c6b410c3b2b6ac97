/// Organization model
///
/// Organizations scope roles and application enablement. Every role belongs
/// to exactly one organization. A "personal" organization is auto-created at
/// signup to contain exactly one user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE organizations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     personal BOOLEAN NOT NULL DEFAULT FALSE,
///     deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     address_street VARCHAR(255),
///     address_city VARCHAR(255),
///     address_country VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,

    /// True for the auto-created organization belonging to exactly one user
    pub personal: bool,

    /// Soft-delete flag
    pub deleted: bool,

    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_country: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional postal address, inlined onto the organization row.
///
/// Participates in the name+address uniqueness pre-check on creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl Organization {
    pub fn address(&self) -> Address {
        Address {
            street: self.address_street.clone(),
            city: self.address_city.clone(),
            country: self.address_country.clone(),
        }
    }
}

/// Input for creating an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub personal: bool,
    pub address: Address,
}

impl CreateOrganization {
    /// A personal organization named after its single member.
    pub fn personal(owner_name: &str) -> Self {
        Self {
            name: format!("{}'s Organization", owner_name),
            personal: true,
            address: Address::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_organization_naming() {
        let org = CreateOrganization::personal("Ada");
        assert_eq!(org.name, "Ada's Organization");
        assert!(org.personal);
        assert_eq!(org.address, Address::default());
    }
}
