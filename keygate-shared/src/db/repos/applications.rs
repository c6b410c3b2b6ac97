/// Applications repository: registered clients and per-organization enablement

use uuid::Uuid;

use crate::db::unit_of_work::Conn;
use crate::models::application::{Application, CreateApplication, OrganizationApplication};

const COLUMNS: &str =
    "id, name, api_url, client_url, secret_key, deleted, created_at, updated_at";

pub struct ApplicationRepo<'a> {
    conn: Conn<'a>,
}

impl<'a> ApplicationRepo<'a> {
    pub(crate) fn new(conn: Conn<'a>) -> Self {
        Self { conn }
    }

    /// Registers a new application.
    pub async fn create(&mut self, input: &CreateApplication) -> Result<Application, sqlx::Error> {
        let sql = format!(
            "INSERT INTO applications (name, api_url, client_url, secret_key) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_one(
                sqlx::query_as::<_, Application>(&sql)
                    .bind(&input.name)
                    .bind(&input.api_url)
                    .bind(&input.client_url)
                    .bind(&input.secret_key),
            )
            .await
    }

    /// Fetches a non-deleted application by id.
    pub async fn find_by_id(&mut self, id: Uuid) -> Result<Option<Application>, sqlx::Error> {
        let sql =
            format!("SELECT {COLUMNS} FROM applications WHERE id = $1 AND deleted = FALSE");

        self.conn
            .fetch_optional(sqlx::query_as::<_, Application>(&sql).bind(id))
            .await
    }

    /// The name duplicate pre-check used before registration.
    pub async fn find_by_name(&mut self, name: &str) -> Result<Option<Application>, sqlx::Error> {
        let sql =
            format!("SELECT {COLUMNS} FROM applications WHERE name = $1 AND deleted = FALSE");

        self.conn
            .fetch_optional(sqlx::query_as::<_, Application>(&sql).bind(name))
            .await
    }

    /// Lists all non-deleted applications.
    pub async fn list(&mut self) -> Result<Vec<Application>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM applications WHERE deleted = FALSE ORDER BY created_at"
        );

        self.conn
            .fetch_all(sqlx::query_as::<_, Application>(&sql))
            .await
    }

    /// Lists the applications enabled (active) for an organization.
    pub async fn list_for_organization(
        &mut self,
        organization_id: Uuid,
    ) -> Result<Vec<Application>, sqlx::Error> {
        let sql = "SELECT a.id, a.name, a.api_url, a.client_url, a.secret_key, a.deleted, \
                    a.created_at, a.updated_at \
             FROM applications a \
             JOIN organization_applications oa ON oa.application_id = a.id \
             WHERE oa.organization_id = $1 AND oa.active = TRUE AND a.deleted = FALSE \
             ORDER BY a.created_at";

        self.conn
            .fetch_all(sqlx::query_as::<_, Application>(sql).bind(organization_id))
            .await
    }

    /// Updates an application's URLs and name.
    pub async fn update(
        &mut self,
        id: Uuid,
        name: &str,
        api_url: &str,
        client_url: &str,
    ) -> Result<Option<Application>, sqlx::Error> {
        let sql = format!(
            "UPDATE applications \
             SET name = $2, api_url = $3, client_url = $4, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_optional(
                sqlx::query_as::<_, Application>(&sql)
                    .bind(id)
                    .bind(name)
                    .bind(api_url)
                    .bind(client_url),
            )
            .await
    }

    /// Enables an application for an organization (idempotent; re-enabling a
    /// deactivated link flips it back to active).
    pub async fn enable_for_organization(
        &mut self,
        organization_id: Uuid,
        application_id: Uuid,
    ) -> Result<OrganizationApplication, sqlx::Error> {
        let sql = "INSERT INTO organization_applications (organization_id, application_id, active) \
             VALUES ($1, $2, TRUE) \
             ON CONFLICT (organization_id, application_id) \
             DO UPDATE SET active = TRUE \
             RETURNING organization_id, application_id, active";

        self.conn
            .fetch_one(
                sqlx::query_as::<_, OrganizationApplication>(sql)
                    .bind(organization_id)
                    .bind(application_id),
            )
            .await
    }

    /// Deactivates an application for an organization without removing the
    /// link row.
    pub async fn disable_for_organization(
        &mut self,
        organization_id: Uuid,
        application_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE organization_applications SET active = FALSE \
                     WHERE organization_id = $1 AND application_id = $2 AND active = TRUE",
                )
                .bind(organization_id)
                .bind(application_id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-deletes an application.
    pub async fn soft_delete(&mut self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE applications SET deleted = TRUE, updated_at = NOW() \
                     WHERE id = $1 AND deleted = FALSE",
                )
                .bind(id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
