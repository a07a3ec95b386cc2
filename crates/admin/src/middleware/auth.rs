//! Admin authentication: the `/admin/*` gate, the token extractor and the
//! token cookie.
//!
//! The token cookie (`luxeshopy_admin`) holds an [`AdminToken`]. Any value
//! that decodes to text containing a colon is accepted.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, Method, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

use luxeshopy_core::token::{ADMIN_COOKIE_MAX_AGE_SECS, ADMIN_COOKIE_NAME};
use luxeshopy_core::{ActionResult, AdminToken};

use crate::error::set_sentry_user;

/// Login page path.
pub const LOGIN_PATH: &str = "/admin/login";

/// Logout path. Anonymous posts here still redirect to the login page.
pub const LOGOUT_PATH: &str = "/admin/logout";

/// Where authenticated admins land.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Message returned to API callers without a session.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Admin session required";

// =============================================================================
// Cookie helpers
// =============================================================================

/// The username named by the admin token cookie, if the cookie is valid.
#[must_use]
pub fn admin_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == ADMIN_COOKIE_NAME)
        .and_then(|cookie| AdminToken::verify(cookie.value()))
}

/// Cookie carrying a freshly issued token.
#[must_use]
pub fn login_cookie(token: AdminToken, secure: bool) -> Cookie<'static> {
    Cookie::build((ADMIN_COOKIE_NAME, String::from(token)))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(Duration::seconds(ADMIN_COOKIE_MAX_AGE_SECS))
        .build()
}

/// Cookie that clears the token.
#[must_use]
pub fn logout_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((ADMIN_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// Gate
// =============================================================================

/// Outcome of the path gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
    /// 401 with the JSON error envelope.
    Unauthorized,
}

/// Whether an anonymous request should get the JSON envelope instead of the
/// login redirect: API calls and data mutations other than logout.
fn wants_envelope(path: &str, is_mutation: bool) -> bool {
    path.starts_with("/admin/api/") || (is_mutation && path != LOGOUT_PATH)
}

/// Decide what to do with a request for `path`.
///
/// Only `/admin` and `/admin/*` are gated. The login page sends
/// authenticated admins to the dashboard. Anonymous page views go to the
/// login page; anonymous API calls and mutations get a 401 envelope.
#[must_use]
pub fn gate(path: &str, is_mutation: bool, authenticated: bool) -> GateDecision {
    let is_admin = path == "/admin" || path.starts_with("/admin/");
    if !is_admin {
        return GateDecision::Allow;
    }

    let is_login = path == LOGIN_PATH || path.starts_with("/admin/login/");
    match (is_login, authenticated) {
        (true, true) if !is_mutation => GateDecision::RedirectToDashboard,
        (false, false) if wants_envelope(path, is_mutation) => GateDecision::Unauthorized,
        (false, false) => GateDecision::RedirectToLogin,
        _ => GateDecision::Allow,
    }
}

fn is_mutation(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ActionResult::<()>::err(UNAUTHORIZED_MESSAGE)),
    )
        .into_response()
}

/// Middleware applying [`gate`] to every request.
pub async fn admin_gate(request: Request, next: Next) -> Response {
    let authenticated = admin_from_headers(request.headers()).is_some();
    let decision = gate(
        request.uri().path(),
        is_mutation(request.method()),
        authenticated,
    );

    match decision {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
        GateDecision::RedirectToDashboard => Redirect::to(DASHBOARD_PATH).into_response(),
        GateDecision::Unauthorized => unauthorized(),
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Extractor that requires a valid admin token; yields the username.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(username): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {username}!")
/// }
/// ```
pub struct RequireAdmin(pub String);

/// Error returned when admin authentication is required but missing.
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// JSON error envelope (for API requests).
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => unauthorized(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = admin_from_headers(&parts.headers).ok_or_else(|| {
            if wants_envelope(parts.uri.path(), is_mutation(&parts.method)) {
                AdminAuthRejection::Unauthorized
            } else {
                AdminAuthRejection::RedirectToLogin
            }
        })?;

        set_sentry_user(&username);
        Ok(Self(username))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request as HttpRequest, routing::get};
    use chrono::Utc;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/admin/login", get(|| async { "login" }))
            .route("/admin/dashboard", get(|| async { "dashboard" }))
            .route("/admin/orders", get(|| async { "orders" }))
            .route("/admin/api/notifications", get(|| async { "{}" }))
            .route("/health", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(admin_gate))
    }

    fn cookie_header() -> String {
        let token = AdminToken::issue("admin", Utc::now());
        format!("{ADMIN_COOKIE_NAME}={}; other=1", token.as_str())
    }

    async fn send(path: &str, cookie: Option<String>) -> Response {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[test]
    fn test_gate_decisions() {
        assert_eq!(gate("/admin/orders", false, false), GateDecision::RedirectToLogin);
        assert_eq!(gate("/admin", false, false), GateDecision::RedirectToLogin);
        assert_eq!(gate("/admin/orders", false, true), GateDecision::Allow);
        assert_eq!(gate("/admin/login", false, false), GateDecision::Allow);
        assert_eq!(gate("/admin/login", true, false), GateDecision::Allow);
        assert_eq!(gate("/admin/login", false, true), GateDecision::RedirectToDashboard);
        assert_eq!(gate("/administrator", false, false), GateDecision::Allow);
        assert_eq!(gate("/health", false, false), GateDecision::Allow);
    }

    #[test]
    fn test_anonymous_api_and_mutations_get_envelope() {
        assert_eq!(
            gate("/admin/api/notifications", false, false),
            GateDecision::Unauthorized
        );
        assert_eq!(gate("/admin/products", true, false), GateDecision::Unauthorized);
        assert_eq!(
            gate("/admin/orders/abc/status", true, false),
            GateDecision::Unauthorized
        );
        assert_eq!(gate("/admin/logout", true, false), GateDecision::RedirectToLogin);
        assert_eq!(gate("/admin/products", true, true), GateDecision::Allow);
    }

    #[tokio::test]
    async fn test_anonymous_admin_page_redirects_to_login() {
        let response = send("/admin/orders", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_logged_in_login_page_redirects_to_dashboard() {
        let response = send("/admin/login", Some(cookie_header())).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), DASHBOARD_PATH);
    }

    #[tokio::test]
    async fn test_valid_token_passes() {
        let response = send("/admin/orders", Some(cookie_header())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_garbage_cookie_is_anonymous() {
        let response = send(
            "/admin/orders",
            Some(format!("{ADMIN_COOKIE_NAME}=not-a-token")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let response = send("/admin/login", Some(format!("{ADMIN_COOKIE_NAME}=x"))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_anonymous_api_call_is_unauthorized() {
        let response = send("/admin/api/notifications", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ActionResult<()> = serde_json::from_slice(&body).unwrap();
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some(UNAUTHORIZED_MESSAGE));
    }

    #[tokio::test]
    async fn test_public_paths_are_not_gated() {
        let response = send("/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_cookies() {
        let token = AdminToken::issue("admin", Utc::now());
        let cookie = login_cookie(token.clone(), true);
        assert_eq!(cookie.name(), ADMIN_COOKIE_NAME);
        assert_eq!(cookie.value(), token.as_str());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));

        let cleared = logout_cookie(false);
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(Duration::ZERO));
    }
}
