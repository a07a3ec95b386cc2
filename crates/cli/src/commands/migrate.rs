//! Database migration commands.
//!
//! Migrations live in the workspace `migrations/` directory and are embedded
//! into the binary at compile time.

use std::collections::HashSet;

use sqlx::migrate::{MigrateError, Migrator};
use thiserror::Error;

use super::{CommandError, connect};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Errors from migration commands.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),
}

/// Apply every pending migration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Print each embedded migration with whether it has been applied.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn status() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let tracked: Option<String> =
        sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations')::text")
            .fetch_one(&pool)
            .await?;

    let applied: HashSet<i64> = if tracked.is_some() {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(&pool)
            .await?
            .into_iter()
            .collect()
    } else {
        HashSet::new()
    };

    let mut pending = 0_usize;
    for migration in MIGRATOR.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            pending += 1;
            "pending"
        };
        tracing::info!("{:>14}  {:<8} {}", migration.version, state, migration.description);
    }

    tracing::info!(pending, "Migration status");
    Ok(())
}
