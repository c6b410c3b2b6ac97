/// Embedded schema migration runner
///
/// Migrations live in `migrations/` at the workspace root and are embedded
/// at compile time. The API server runs pending migrations at startup.

use sqlx::postgres::PgPool;
use tracing::info;

/// Runs all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration is malformed or fails to apply; failed
/// migrations are rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");
    sqlx::migrate!("../migrations").run(pool).await?;
    info!("Database migrations up to date");
    Ok(())
}
