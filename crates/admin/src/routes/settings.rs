//! Settings: password change and UI language.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{AdminRepository, RepositoryError};
use crate::filters;
use crate::i18n::Language;
use crate::middleware::RequireAdmin;
use crate::middleware::auth::admin_from_headers;
use crate::models::{Flash, session};
use crate::routes::{Page, render};
use crate::state::AppState;

const SETTINGS_PATH: &str = "/admin/settings";

/// Shortest password accepted on change.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A language `<option>`.
#[derive(Debug, Clone)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
    pub selected: bool,
}

/// Settings page template.
#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub page: Page,
    pub languages: Vec<LanguageOption>,
    pub min_password_len: usize,
}

/// Password change form.
#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Language form.
#[derive(Debug, Deserialize)]
pub struct LanguageForm {
    pub language: String,
}

/// Why a password change was refused, in the order the checks run.
#[derive(Debug, thiserror::Error)]
pub enum PasswordChangeError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("User not found")]
    UserNotFound,
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("Password must be at least 8 characters")]
    TooShort,
    #[error("Failed to update password")]
    UpdateFailed,
}

fn check_length(new_password: &str) -> Result<(), PasswordChangeError> {
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordChangeError::TooShort);
    }
    Ok(())
}

/// Verify the current password, then store the new one.
async fn change_password(
    repo: &AdminRepository<'_>,
    username: Option<&str>,
    form: &PasswordForm,
) -> Result<(), PasswordChangeError> {
    let username = username.ok_or(PasswordChangeError::NotAuthenticated)?;

    // A failed lookup reads as a missing account.
    repo.get_by_username(username)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Admin lookup failed");
            PasswordChangeError::UserNotFound
        })?
        .ok_or(PasswordChangeError::UserNotFound)?;
    repo.verify_credentials(username, &form.current_password)
        .await
        .map_err(|e: RepositoryError| {
            tracing::error!(error = %e, "Credential check failed");
            PasswordChangeError::UpdateFailed
        })?
        .ok_or(PasswordChangeError::IncorrectPassword)?;

    check_length(&form.new_password)?;

    repo.update_password(username, &form.new_password)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password update failed");
            PasswordChangeError::UpdateFailed
        })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(SETTINGS_PATH, get(index))
        .route("/admin/settings/password", post(update_password))
        .route("/admin/settings/language", post(update_language))
}

/// Settings page.
#[instrument(skip(admin, session))]
pub async fn index(RequireAdmin(admin): RequireAdmin, session: Session) -> Html<String> {
    let page = Page::load(&session, admin, SETTINGS_PATH).await;
    let languages = Language::ALL
        .iter()
        .map(|l| LanguageOption {
            code: l.code(),
            name: l.native_name(),
            selected: *l == page.lang,
        })
        .collect();
    render(&SettingsTemplate {
        page,
        languages,
        min_password_len: MIN_PASSWORD_LEN,
    })
}

/// Change the admin password.
#[instrument(skip_all)]
pub async fn update_password(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<PasswordForm>,
) -> Response {
    let admin = admin_from_headers(&headers);
    let repo = AdminRepository::new(state.pool());

    let flash = match change_password(&repo, admin.as_deref(), &form).await {
        Ok(()) => {
            tracing::info!(username = ?admin, "Admin password changed");
            Flash::success("Password updated successfully")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Password change refused");
            Flash::error(e.to_string())
        }
    };
    flash.store(&session).await;
    Redirect::to(SETTINGS_PATH).into_response()
}

/// Switch the UI language.
#[instrument(skip(_admin, session))]
pub async fn update_language(
    RequireAdmin(_admin): RequireAdmin,
    session: Session,
    Form(form): Form<LanguageForm>,
) -> Response {
    let flash = match form.language.parse::<Language>() {
        Ok(language) => match session::set_language(&session, language).await {
            Ok(()) => Flash::success(format!(
                "{}: {}",
                language.strings().language,
                language.native_name()
            )),
            Err(e) => {
                tracing::error!(error = %e, "Failed to store language");
                Flash::error("Failed to change language")
            }
        },
        Err(e) => Flash::error(e),
    };
    flash.store(&session).await;
    Redirect::to(SETTINGS_PATH).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_length_rule() {
        assert!(matches!(
            check_length("short"),
            Err(PasswordChangeError::TooShort)
        ));
        assert!(check_length("eightchr").is_ok());
        // Counted in characters, not bytes.
        assert!(matches!(
            check_length("كلمةسر"),
            Err(PasswordChangeError::TooShort)
        ));
    }

    #[test]
    fn test_messages() {
        let messages: Vec<String> = [
            PasswordChangeError::NotAuthenticated,
            PasswordChangeError::UserNotFound,
            PasswordChangeError::IncorrectPassword,
            PasswordChangeError::TooShort,
            PasswordChangeError::UpdateFailed,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(
            messages,
            [
                "Not authenticated",
                "User not found",
                "Current password is incorrect",
                "Password must be at least 8 characters",
                "Failed to update password",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_session_checked_first() {
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let repo = AdminRepository::new(&pool);
        let form = PasswordForm {
            current_password: String::new(),
            new_password: "x".to_string(),
        };
        let err = change_password(&repo, None, &form).await.unwrap_err();
        assert!(matches!(err, PasswordChangeError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_lookup_failure_reports_missing_user() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://127.0.0.1:1/unreachable")
            .unwrap();
        let repo = AdminRepository::new(&pool);
        let form = PasswordForm {
            current_password: "old-password".to_string(),
            new_password: "new-password".to_string(),
        };
        let err = change_password(&repo, Some("admin"), &form).await.unwrap_err();
        assert!(matches!(err, PasswordChangeError::UserNotFound));
        assert_eq!(err.to_string(), "User not found");
    }
}
