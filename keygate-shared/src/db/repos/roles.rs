/// Roles repository: roles, their permission grants, and user membership
///
/// Loads the inputs for permission resolution (`loaded_roles_for_user`); the
/// resolution itself is pure and lives in `crate::auth::permissions`.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::db::unit_of_work::Conn;
use crate::models::role::{CreateRole, LoadedRole, Role};

const COLUMNS: &str =
    "id, name, organization_id, application_id, deleted, created_at, updated_at";

/// Raw join row behind `loaded_roles_for_user`.
#[derive(sqlx::FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    deleted: bool,
    permission_name: Option<String>,
}

pub struct RoleRepo<'a> {
    conn: Conn<'a>,
}

impl<'a> RoleRepo<'a> {
    pub(crate) fn new(conn: Conn<'a>) -> Self {
        Self { conn }
    }

    /// Inserts a new role and returns the stored row.
    pub async fn create(&mut self, input: &CreateRole) -> Result<Role, sqlx::Error> {
        let sql = format!(
            "INSERT INTO roles (name, organization_id, application_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_one(
                sqlx::query_as::<_, Role>(&sql)
                    .bind(&input.name)
                    .bind(input.organization_id)
                    .bind(input.application_id),
            )
            .await
    }

    /// Fetches a non-deleted role by id.
    pub async fn find_by_id(&mut self, id: Uuid) -> Result<Option<Role>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM roles WHERE id = $1 AND deleted = FALSE");

        self.conn
            .fetch_optional(sqlx::query_as::<_, Role>(&sql).bind(id))
            .await
    }

    /// Lists the non-deleted roles of one organization.
    pub async fn list_for_organization(
        &mut self,
        organization_id: Uuid,
    ) -> Result<Vec<Role>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM roles \
             WHERE organization_id = $1 AND deleted = FALSE \
             ORDER BY created_at"
        );

        self.conn
            .fetch_all(sqlx::query_as::<_, Role>(&sql).bind(organization_id))
            .await
    }

    /// Loads every role a user is a member of, with its permission names,
    /// as input for permission resolution.
    ///
    /// Deleted roles are returned with their `deleted` flag set rather than
    /// filtered in SQL; resolution excludes them. Resolution is therefore
    /// testable without a database and the query stays a plain join.
    pub async fn loaded_roles_for_user(
        &mut self,
        user_id: Uuid,
    ) -> Result<Vec<LoadedRole>, sqlx::Error> {
        let sql = "SELECT r.id AS role_id, r.deleted, rp.permission_name \
             FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             LEFT JOIN role_permissions rp ON rp.role_id = r.id \
             WHERE ur.user_id = $1 \
             ORDER BY r.id";

        let rows = self
            .conn
            .fetch_all(sqlx::query_as::<_, RolePermissionRow>(sql).bind(user_id))
            .await?;

        // Group the flat join result by role. A role with no grants still
        // yields one row (NULL permission) and must appear in the output.
        let mut grouped: BTreeMap<Uuid, LoadedRole> = BTreeMap::new();
        for row in rows {
            let entry = grouped.entry(row.role_id).or_insert(LoadedRole {
                role_id: row.role_id,
                deleted: row.deleted,
                permission_names: Vec::new(),
            });
            if let Some(name) = row.permission_name {
                entry.permission_names.push(name);
            }
        }

        Ok(grouped.into_values().collect())
    }

    /// Replaces a role's permission grants with exactly `permission_names`.
    ///
    /// Full replace, not a diff: delete all grants, insert the new set. Runs
    /// inside the caller's transaction so readers never observe the empty
    /// intermediate state.
    pub async fn replace_permissions(
        &mut self,
        role_id: Uuid,
        permission_names: &[String],
    ) -> Result<(), sqlx::Error> {
        self.conn
            .execute(
                sqlx::query("DELETE FROM role_permissions WHERE role_id = $1").bind(role_id),
            )
            .await?;

        for name in permission_names {
            self.conn
                .execute(
                    sqlx::query(
                        "INSERT INTO role_permissions (role_id, permission_name) \
                         VALUES ($1, $2)",
                    )
                    .bind(role_id)
                    .bind(name),
                )
                .await?;
        }

        Ok(())
    }

    /// Grants role membership to a user (idempotent).
    pub async fn assign_to_user(&mut self, user_id: Uuid, role_id: Uuid) -> Result<(), sqlx::Error> {
        self.conn
            .execute(
                sqlx::query(
                    "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) \
                     ON CONFLICT DO NOTHING",
                )
                .bind(user_id)
                .bind(role_id),
            )
            .await?;

        Ok(())
    }

    /// Revokes role membership from a user.
    pub async fn remove_from_user(
        &mut self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
                    .bind(user_id)
                    .bind(role_id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Renames a role; returns the updated row or None when it does not
    /// exist (or is deleted).
    pub async fn rename(&mut self, id: Uuid, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let sql = format!(
            "UPDATE roles SET name = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_optional(sqlx::query_as::<_, Role>(&sql).bind(id).bind(name))
            .await
    }

    /// Soft-deletes a role. Memberships and grants are left in place; the
    /// deleted flag excludes the role from permission resolution.
    pub async fn soft_delete(&mut self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE roles SET deleted = TRUE, updated_at = NOW() \
                     WHERE id = $1 AND deleted = FALSE",
                )
                .bind(id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
