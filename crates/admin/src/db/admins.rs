//! Admin credential repository.
//!
//! The `password_hash` column stores the password exactly as typed and login
//! compares it verbatim. There is one admin account.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use luxeshopy_core::AdminId;

use super::RepositoryError;

/// A stored admin account.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: AdminId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: Uuid,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<&AdminRow> for AdminAccount {
    fn from(row: &AdminRow) -> Self {
        Self {
            id: AdminId::new(row.id),
            username: row.username.clone(),
            created_at: row.created_at,
        }
    }
}

/// Repository for the admin credential.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn find_row(&self, username: &str) -> Result<Option<AdminRow>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, username, password_hash, created_at FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Look up an account by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        Ok(self.find_row(username).await?.as_ref().map(AdminAccount::from))
    }

    /// Check a username/password pair, returning the account on a match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        let row = self.find_row(username).await?;
        Ok(row
            .filter(|r| r.password_hash == password)
            .as_ref()
            .map(AdminAccount::from))
    }

    /// Replace the password of an existing account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the username does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE admins SET password_hash = $2 WHERE username = $1")
            .bind(username)
            .bind(new_password)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminAccount, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            INSERT INTO admins (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            ",
        )
        .bind(username)
        .bind(password)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(format!("admin '{username}' already exists"))
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(AdminAccount::from(&row))
    }
}
