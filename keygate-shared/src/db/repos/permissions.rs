/// Permissions repository

use crate::db::unit_of_work::Conn;
use crate::models::permission::{CreatePermission, Permission};

const COLUMNS: &str =
    "name, display_name, description, is_system_admin, deleted, created_at, edited_at";

pub struct PermissionRepo<'a> {
    conn: Conn<'a>,
}

impl<'a> PermissionRepo<'a> {
    pub(crate) fn new(conn: Conn<'a>) -> Self {
        Self { conn }
    }

    /// Inserts a new permission. The name is the primary key; callers run
    /// the duplicate pre-check first.
    pub async fn create(&mut self, input: &CreatePermission) -> Result<Permission, sqlx::Error> {
        let sql = format!(
            "INSERT INTO permissions (name, display_name, description, is_system_admin) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_one(
                sqlx::query_as::<_, Permission>(&sql)
                    .bind(&input.name)
                    .bind(&input.display_name)
                    .bind(&input.description)
                    .bind(input.is_system_admin),
            )
            .await
    }

    /// Fetches a non-deleted permission by name.
    pub async fn find_by_name(&mut self, name: &str) -> Result<Option<Permission>, sqlx::Error> {
        let sql =
            format!("SELECT {COLUMNS} FROM permissions WHERE name = $1 AND deleted = FALSE");

        self.conn
            .fetch_optional(sqlx::query_as::<_, Permission>(&sql).bind(name))
            .await
    }

    /// Lists all non-deleted permissions.
    pub async fn list(&mut self) -> Result<Vec<Permission>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM permissions WHERE deleted = FALSE ORDER BY name");

        self.conn
            .fetch_all(sqlx::query_as::<_, Permission>(&sql))
            .await
    }

    /// Updates the display metadata of a permission.
    pub async fn update(
        &mut self,
        name: &str,
        display_name: &str,
        description: &str,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let sql = format!(
            "UPDATE permissions \
             SET display_name = $2, description = $3, edited_at = NOW() \
             WHERE name = $1 AND deleted = FALSE \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_optional(
                sqlx::query_as::<_, Permission>(&sql)
                    .bind(name)
                    .bind(display_name)
                    .bind(description),
            )
            .await
    }

    /// Soft-deletes a permission. Existing grants keep referencing the row;
    /// role permission loads still return the name, so tokens issued later
    /// simply stop carrying it once grants are cleaned up.
    pub async fn soft_delete(&mut self, name: &str) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE permissions SET deleted = TRUE, edited_at = NOW() \
                     WHERE name = $1 AND deleted = FALSE",
                )
                .bind(name),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
