/// External identity-provider accounts repository

use uuid::Uuid;

use crate::db::unit_of_work::Conn;
use crate::models::account::Account;

const COLUMNS: &str = "id, user_id, provider, provider_account_id, deleted, created_at";

pub struct AccountRepo<'a> {
    conn: Conn<'a>,
}

impl<'a> AccountRepo<'a> {
    pub(crate) fn new(conn: Conn<'a>) -> Self {
        Self { conn }
    }

    /// Links an external provider account to a user. Callers run the
    /// provider duplicate pre-check first.
    pub async fn link(
        &mut self,
        user_id: Uuid,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Account, sqlx::Error> {
        let sql = format!(
            "INSERT INTO accounts (user_id, provider, provider_account_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_one(
                sqlx::query_as::<_, Account>(&sql)
                    .bind(user_id)
                    .bind(provider)
                    .bind(provider_account_id),
            )
            .await
    }

    /// Resolves a provider identity to its linked account, if any.
    pub async fn find_by_provider(
        &mut self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM accounts \
             WHERE provider = $1 AND provider_account_id = $2 AND deleted = FALSE"
        );

        self.conn
            .fetch_optional(
                sqlx::query_as::<_, Account>(&sql)
                    .bind(provider)
                    .bind(provider_account_id),
            )
            .await
    }

    /// Lists the non-deleted provider links of a user.
    pub async fn list_for_user(&mut self, user_id: Uuid) -> Result<Vec<Account>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM accounts \
             WHERE user_id = $1 AND deleted = FALSE ORDER BY created_at"
        );

        self.conn
            .fetch_all(sqlx::query_as::<_, Account>(&sql).bind(user_id))
            .await
    }

    /// Unlinks (soft-deletes) a provider account from a user.
    pub async fn unlink(&mut self, user_id: Uuid, account_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE accounts SET deleted = TRUE \
                     WHERE id = $1 AND user_id = $2 AND deleted = FALSE",
                )
                .bind(account_id)
                .bind(user_id),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
