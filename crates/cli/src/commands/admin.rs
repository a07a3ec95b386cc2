//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! lux-cli admin create -u admin -p 'a-long-password'
//! lux-cli admin set-password -u admin -p 'another-password'
//! ```

use luxeshopy_admin::db::{AdminRepository, RepositoryError};
use luxeshopy_admin::routes::settings::MIN_PASSWORD_LEN;
use thiserror::Error;

use super::{CommandError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Username is blank.
    #[error("Username is required")]
    MissingUsername,

    /// Password shorter than the dashboard allows.
    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    /// Account already exists.
    #[error("Admin already exists: {0}")]
    UserExists(String),

    /// No account with that username.
    #[error("No admin with username: {0}")]
    UnknownUser(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

fn validate(username: &str, password: &str) -> Result<(), AdminError> {
    if username.trim().is_empty() {
        return Err(AdminError::MissingUsername);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AdminError::PasswordTooShort);
    }
    Ok(())
}

/// Create the admin account.
///
/// # Errors
///
/// Returns an error if validation fails, the username is taken, or the
/// database is unreachable.
pub async fn create(username: &str, password: &str) -> Result<(), AdminError> {
    validate(username, password)?;
    let pool = connect().await?;
    let username = username.trim();

    let account = AdminRepository::new(&pool)
        .create(username, password)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(username.to_owned()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Admin created successfully! ID: {}, Username: {}",
        account.id,
        account.username
    );
    Ok(())
}

/// Replace the password of an existing account.
///
/// # Errors
///
/// Returns an error if validation fails, the account does not exist, or the
/// database is unreachable.
pub async fn set_password(username: &str, password: &str) -> Result<(), AdminError> {
    validate(username, password)?;
    let pool = connect().await?;
    let username = username.trim();

    AdminRepository::new(&pool)
        .update_password(username, password)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UnknownUser(username.to_owned()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!("Password updated for {}", username);
    Ok(())
}
