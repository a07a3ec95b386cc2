//! Login and logout.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::AdminToken;

use crate::db::AdminRepository;
use crate::error::clear_sentry_user;
use crate::i18n::{Language, Strings};
use crate::middleware::auth::{DASHBOARD_PATH, LOGIN_PATH, login_cookie, logout_cookie};
use crate::models::session;
use crate::routes::render;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub t: &'static Strings,
    pub lang: Language,
    pub username: String,
    pub error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/login", get(login_page).post(login))
        .route("/admin/logout", post(logout))
}

/// Display the login page.
#[instrument(skip(session))]
pub async fn login_page(session: Session) -> Response {
    let lang = session::language(&session).await;
    render(&LoginTemplate {
        t: lang.strings(),
        lang,
        username: String::new(),
        error: None,
    })
    .into_response()
}

/// Verify credentials and issue the token cookie.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim().to_string();
    let lang = session::language(&session).await;

    let failure = |status: StatusCode, message: &str| {
        (
            status,
            render(&LoginTemplate {
                t: lang.strings(),
                lang,
                username: username.clone(),
                error: Some(message.to_string()),
            }),
        )
            .into_response()
    };

    if username.is_empty() || form.password.is_empty() {
        return failure(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS);
    }

    match AdminRepository::new(state.pool())
        .verify_credentials(&username, &form.password)
        .await
    {
        Ok(Some(account)) => {
            tracing::info!(username = %account.username, "Admin logged in");
            let token = AdminToken::issue(&account.username, Utc::now());
            let cookie = login_cookie(token, state.config().is_secure());
            (
                [(header::SET_COOKIE, cookie.to_string())],
                Redirect::to(DASHBOARD_PATH),
            )
                .into_response()
        }
        Ok(None) => {
            tracing::warn!("Rejected admin login");
            failure(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS)
        }
        Err(e) => {
            tracing::error!(error = %e, "Login lookup failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed, please try again",
            )
        }
    }
}

/// Clear the token cookie.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Response {
    clear_sentry_user();
    let cookie = logout_cookie(state.config().is_secure());
    (
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}
