/// Users repository

use chrono::Utc;
use uuid::Uuid;

use crate::db::unit_of_work::Conn;
use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "id, first_name, last_name, email, password_hash, disabled, \
     deleted, email_verified, created_at, updated_at, last_login_at";

pub struct UserRepo<'a> {
    conn: Conn<'a>,
}

impl<'a> UserRepo<'a> {
    pub(crate) fn new(conn: Conn<'a>) -> Self {
        Self { conn }
    }

    /// Inserts a new user and returns the stored row.
    ///
    /// Callers run the email conflict pre-check first; the unique index on
    /// `email WHERE NOT deleted` is the backstop for the remaining race.
    pub async fn create(&mut self, input: &CreateUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_one(
                sqlx::query_as::<_, User>(&sql)
                    .bind(&input.first_name)
                    .bind(&input.last_name)
                    .bind(&input.email)
                    .bind(&input.password_hash),
            )
            .await
    }

    /// Fetches a non-deleted user by id.
    pub async fn find_by_id(&mut self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted = FALSE");

        self.conn
            .fetch_optional(sqlx::query_as::<_, User>(&sql).bind(id))
            .await
    }

    /// Fetches a non-deleted user by primary email (case-insensitive).
    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE LOWER(email) = LOWER($1) AND deleted = FALSE"
        );

        self.conn
            .fetch_optional(sqlx::query_as::<_, User>(&sql).bind(email))
            .await
    }

    /// Lists all non-deleted users.
    pub async fn list(&mut self) -> Result<Vec<User>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM users WHERE deleted = FALSE ORDER BY created_at"
        );

        self.conn.fetch_all(sqlx::query_as::<_, User>(&sql)).await
    }

    /// Updates name and email; returns the updated row, or None if the user
    /// does not exist (or is deleted).
    pub async fn update_profile(
        &mut self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let sql = format!(
            "UPDATE users \
             SET first_name = $2, last_name = $3, email = $4, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_optional(
                sqlx::query_as::<_, User>(&sql)
                    .bind(id)
                    .bind(first_name)
                    .bind(last_name)
                    .bind(email),
            )
            .await
    }

    /// Replaces the stored credential (already hashed by the caller).
    pub async fn set_password_hash(
        &mut self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE users SET password_hash = $2, updated_at = NOW() \
                     WHERE id = $1 AND deleted = FALSE",
                )
                .bind(id)
                .bind(password_hash),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Enables or disables login for a user without deleting it.
    pub async fn set_disabled(&mut self, id: Uuid, disabled: bool) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE users SET disabled = $2, updated_at = NOW() \
                     WHERE id = $1 AND deleted = FALSE",
                )
                .bind(id)
                .bind(disabled),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the primary email as verified.
    pub async fn mark_email_verified(&mut self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE users SET email_verified = TRUE, updated_at = NOW() \
                     WHERE id = $1 AND deleted = FALSE",
                )
                .bind(id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamps `last_login_at` after a successful credential check.
    pub async fn record_login(&mut self, id: Uuid, at: chrono::DateTime<Utc>) -> Result<(), sqlx::Error> {
        self.conn
            .execute(
                sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
                    .bind(id)
                    .bind(at),
            )
            .await?;

        Ok(())
    }

    /// Soft-deletes a user. The row remains for audit; all reads exclude it.
    pub async fn soft_delete(&mut self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE users SET deleted = TRUE, updated_at = NOW() \
                     WHERE id = $1 AND deleted = FALSE",
                )
                .bind(id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
