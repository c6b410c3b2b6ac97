/// Organizations repository

use uuid::Uuid;

use crate::db::unit_of_work::Conn;
use crate::models::organization::{Address, CreateOrganization, Organization};

const COLUMNS: &str = "id, name, personal, deleted, address_street, address_city, \
     address_country, created_at, updated_at";

pub struct OrganizationRepo<'a> {
    conn: Conn<'a>,
}

impl<'a> OrganizationRepo<'a> {
    pub(crate) fn new(conn: Conn<'a>) -> Self {
        Self { conn }
    }

    /// Inserts a new organization and returns the stored row.
    pub async fn create(
        &mut self,
        input: &CreateOrganization,
    ) -> Result<Organization, sqlx::Error> {
        let sql = format!(
            "INSERT INTO organizations \
             (name, personal, address_street, address_city, address_country) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_one(
                sqlx::query_as::<_, Organization>(&sql)
                    .bind(&input.name)
                    .bind(input.personal)
                    .bind(&input.address.street)
                    .bind(&input.address.city)
                    .bind(&input.address.country),
            )
            .await
    }

    /// Fetches a non-deleted organization by id.
    pub async fn find_by_id(&mut self, id: Uuid) -> Result<Option<Organization>, sqlx::Error> {
        let sql =
            format!("SELECT {COLUMNS} FROM organizations WHERE id = $1 AND deleted = FALSE");

        self.conn
            .fetch_optional(sqlx::query_as::<_, Organization>(&sql).bind(id))
            .await
    }

    /// The name+address duplicate pre-check used before creation. NULL
    /// address parts compare as equal so two address-less duplicates match.
    pub async fn find_by_name_and_address(
        &mut self,
        name: &str,
        address: &Address,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM organizations \
             WHERE name = $1 \
               AND address_street IS NOT DISTINCT FROM $2 \
               AND address_city IS NOT DISTINCT FROM $3 \
               AND address_country IS NOT DISTINCT FROM $4 \
               AND deleted = FALSE"
        );

        self.conn
            .fetch_optional(
                sqlx::query_as::<_, Organization>(&sql)
                    .bind(name)
                    .bind(&address.street)
                    .bind(&address.city)
                    .bind(&address.country),
            )
            .await
    }

    /// Lists the non-deleted organizations a user belongs to, through role
    /// membership.
    pub async fn list_for_user(&mut self, user_id: Uuid) -> Result<Vec<Organization>, sqlx::Error> {
        let sql = "SELECT DISTINCT o.id, o.name, o.personal, o.deleted, o.address_street, \
                    o.address_city, o.address_country, o.created_at, o.updated_at \
             FROM organizations o \
             JOIN roles r ON r.organization_id = o.id \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 AND o.deleted = FALSE \
             ORDER BY o.created_at";

        self.conn
            .fetch_all(sqlx::query_as::<_, Organization>(sql).bind(user_id))
            .await
    }

    /// Updates name and address; returns the updated row, or None when the
    /// organization does not exist (or is deleted).
    pub async fn update(
        &mut self,
        id: Uuid,
        name: &str,
        address: &Address,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let sql = format!(
            "UPDATE organizations \
             SET name = $2, address_street = $3, address_city = $4, \
                 address_country = $5, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_optional(
                sqlx::query_as::<_, Organization>(&sql)
                    .bind(id)
                    .bind(name)
                    .bind(&address.street)
                    .bind(&address.city)
                    .bind(&address.country),
            )
            .await
    }

    /// Soft-deletes an organization.
    pub async fn soft_delete(&mut self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE organizations SET deleted = TRUE, updated_at = NOW() \
                     WHERE id = $1 AND deleted = FALSE",
                )
                .bind(id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
