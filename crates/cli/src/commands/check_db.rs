//! Database connectivity check.

use super::{CommandError, connect};

const TABLES: [&str; 4] = ["products", "orders", "admins", "contacts"];

/// Connect, report the server version and count rows in each shop table.
///
/// A missing table is reported and skipped; run `lux-cli migrate run` first.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let version: String = sqlx::query_scalar("SELECT version()")
        .fetch_one(&pool)
        .await?;
    tracing::info!(%version, "Database reachable");

    for table in TABLES {
        // Table names come from the constant above, never from input.
        let query = format!("SELECT COUNT(*) FROM {table}");
        match sqlx::query_scalar::<_, i64>(&query).fetch_one(&pool).await {
            Ok(count) => tracing::info!(table, count, "Table ok"),
            Err(e) => tracing::warn!(table, error = %e, "Table check failed"),
        }
    }
    Ok(())
}
