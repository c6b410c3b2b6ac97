/// Security tokens repository: password reset and email verification
///
/// Only digests are stored; lookup is by digest, never by plaintext.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::unit_of_work::Conn;
use crate::models::security_token::{SecurityToken, SecurityTokenKind};

const COLUMNS: &str = "id, user_id, kind, token_digest, expires_at, used_at, created_at";

pub struct SecurityTokenRepo<'a> {
    conn: Conn<'a>,
}

impl<'a> SecurityTokenRepo<'a> {
    pub(crate) fn new(conn: Conn<'a>) -> Self {
        Self { conn }
    }

    /// Stores a new token digest for a user.
    pub async fn create(
        &mut self,
        user_id: Uuid,
        kind: SecurityTokenKind,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<SecurityToken, sqlx::Error> {
        let sql = format!(
            "INSERT INTO security_tokens (user_id, kind, token_digest, expires_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );

        self.conn
            .fetch_one(
                sqlx::query_as::<_, SecurityToken>(&sql)
                    .bind(user_id)
                    .bind(kind)
                    .bind(token_digest)
                    .bind(expires_at),
            )
            .await
    }

    /// Looks up a token of the given kind by digest. Returns the row even if
    /// expired or used; the caller decides redeemability so all failure
    /// modes produce the same outward error.
    pub async fn find_by_digest(
        &mut self,
        kind: SecurityTokenKind,
        token_digest: &str,
    ) -> Result<Option<SecurityToken>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM security_tokens \
             WHERE kind = $1 AND token_digest = $2"
        );

        self.conn
            .fetch_optional(
                sqlx::query_as::<_, SecurityToken>(&sql)
                    .bind(kind)
                    .bind(token_digest),
            )
            .await
    }

    /// Consumes a token. Guarded on `used_at IS NULL` so a token redeems at
    /// most once even under concurrent attempts.
    pub async fn mark_used(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE security_tokens SET used_at = $2 \
                     WHERE id = $1 AND used_at IS NULL",
                )
                .bind(id)
                .bind(at),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Invalidates all outstanding tokens of one kind for a user, so issuing
    /// a new reset link cancels older ones.
    pub async fn invalidate_outstanding(
        &mut self,
        user_id: Uuid,
        kind: SecurityTokenKind,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = self
            .conn
            .execute(
                sqlx::query(
                    "UPDATE security_tokens SET used_at = $3 \
                     WHERE user_id = $1 AND kind = $2 AND used_at IS NULL",
                )
                .bind(user_id)
                .bind(kind)
                .bind(at),
            )
            .await?;

        Ok(result.rows_affected())
    }
}
