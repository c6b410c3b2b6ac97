/// Per-entity repositories
///
/// All SQL lives here. Repositories are cheap borrow-scoped views handed out
/// by the unit of work; they never own a connection and never open or close
/// transactions themselves. Every read filters `deleted = FALSE` and every
/// delete is a soft delete, so removed rows stay queryable for audit.

use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, Postgres};

use super::unit_of_work::Conn;

pub mod accounts;
pub mod applications;
pub mod contacts;
pub mod organizations;
pub mod permissions;
pub mod roles;
pub mod security_tokens;
pub mod users;

// Bridges a prepared query onto whichever executor the unit of work is
// currently bound to (open transaction or bare pool).
impl<'c> Conn<'c> {
    pub(crate) async fn fetch_one<T>(
        &mut self,
        query: QueryAs<'_, Postgres, T, PgArguments>,
    ) -> Result<T, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        match self {
            Conn::Tx(tx) => query.fetch_one(&mut **tx).await,
            Conn::Pool(pool) => query.fetch_one(*pool).await,
        }
    }

    pub(crate) async fn fetch_optional<T>(
        &mut self,
        query: QueryAs<'_, Postgres, T, PgArguments>,
    ) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        match self {
            Conn::Tx(tx) => query.fetch_optional(&mut **tx).await,
            Conn::Pool(pool) => query.fetch_optional(*pool).await,
        }
    }

    pub(crate) async fn fetch_all<T>(
        &mut self,
        query: QueryAs<'_, Postgres, T, PgArguments>,
    ) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        match self {
            Conn::Tx(tx) => query.fetch_all(&mut **tx).await,
            Conn::Pool(pool) => query.fetch_all(*pool).await,
        }
    }

    pub(crate) async fn execute(
        &mut self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<PgQueryResult, sqlx::Error> {
        match self {
            Conn::Tx(tx) => query.execute(&mut **tx).await,
            Conn::Pool(pool) => query.execute(*pool).await,
        }
    }
}
