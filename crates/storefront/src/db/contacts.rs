//! Contact message repository.

use sqlx::PgPool;
use uuid::Uuid;

use luxeshopy_core::Email;

use super::RepositoryError;

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub message: String,
}

/// Repository for the `contacts` table.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a message and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, message: &NewContactMessage) -> Result<Uuid, RepositoryError> {
        let id = sqlx::query_scalar(
            "INSERT INTO contacts (name, email, message) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.message)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }
}
