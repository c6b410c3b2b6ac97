/// Secondary contacts repository: user emails and user phones

use uuid::Uuid;

use crate::db::unit_of_work::Conn;
use crate::models::contact::{UserEmail, UserPhone};

pub struct ContactRepo<'a> {
    conn: Conn<'a>,
}

impl<'a> ContactRepo<'a> {
    pub(crate) fn new(conn: Conn<'a>) -> Self {
        Self { conn }
    }

    /// Adds a secondary email address to a user.
    pub async fn add_email(&mut self, user_id: Uuid, email: &str) -> Result<UserEmail, sqlx::Error> {
        let sql = "INSERT INTO user_emails (user_id, email) VALUES ($1, $2) \
             RETURNING id, user_id, email, deleted, created_at";

        self.conn
            .fetch_one(sqlx::query_as::<_, UserEmail>(sql).bind(user_id).bind(email))
            .await
    }

    /// Lists a user's non-deleted secondary email addresses.
    pub async fn list_emails(&mut self, user_id: Uuid) -> Result<Vec<UserEmail>, sqlx::Error> {
        let sql = "SELECT id, user_id, email, deleted, created_at FROM user_emails \
             WHERE user_id = $1 AND deleted = FALSE ORDER BY created_at";

        self.conn
            .fetch_all(sqlx::query_as::<_, UserEmail>(sql).bind(user_id))
            .await
    }

    /// Soft-deletes one of a user's secondary email addresses.
    pub async fn remove_email(&mut self, user_id: Uuid, email_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE user_emails SET deleted = TRUE \
                     WHERE id = $1 AND user_id = $2 AND deleted = FALSE",
                )
                .bind(email_id)
                .bind(user_id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds a phone number to a user.
    pub async fn add_phone(
        &mut self,
        user_id: Uuid,
        phone_number: &str,
        label: Option<&str>,
    ) -> Result<UserPhone, sqlx::Error> {
        let sql = "INSERT INTO user_phones (user_id, phone_number, label) VALUES ($1, $2, $3) \
             RETURNING id, user_id, phone_number, label, deleted, created_at";

        self.conn
            .fetch_one(
                sqlx::query_as::<_, UserPhone>(sql)
                    .bind(user_id)
                    .bind(phone_number)
                    .bind(label),
            )
            .await
    }

    /// Lists a user's non-deleted phone numbers.
    pub async fn list_phones(&mut self, user_id: Uuid) -> Result<Vec<UserPhone>, sqlx::Error> {
        let sql = "SELECT id, user_id, phone_number, label, deleted, created_at FROM user_phones \
             WHERE user_id = $1 AND deleted = FALSE ORDER BY created_at";

        self.conn
            .fetch_all(sqlx::query_as::<_, UserPhone>(sql).bind(user_id))
            .await
    }

    /// Soft-deletes one of a user's phone numbers.
    pub async fn remove_phone(&mut self, user_id: Uuid, phone_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE user_phones SET deleted = TRUE \
                     WHERE id = $1 AND user_id = $2 AND deleted = FALSE",
                )
                .bind(phone_id)
                .bind(user_id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
