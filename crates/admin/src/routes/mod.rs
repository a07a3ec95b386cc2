//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /admin/login                     - Login page
//! POST /admin/login                     - Verify credentials, set token cookie
//! POST /admin/logout                    - Clear token cookie
//!
//! # Dashboard
//! GET  /admin, /admin/dashboard         - Stats, sales chart, periods, recent orders
//! GET  /admin/insights                  - 7-day chart, status distribution, profit
//!
//! # Orders
//! GET  /admin/orders                    - Order listing (newest first)
//! GET  /admin/orders/{id}               - Order detail
//! POST /admin/orders/{id}/status        - Update status (JSON envelope)
//! POST /admin/orders/{id}/payment       - Update payment status (JSON envelope)
//!
//! # Products
//! GET  /admin/products                  - Product listing
//! GET  /admin/products/new              - Create form
//! POST /admin/products                  - Create (multipart, optional upload)
//! GET  /admin/products/{id}/edit        - Edit form
//! POST /admin/products/{id}             - Update (multipart, optional upload)
//! POST /admin/products/{id}/delete      - Delete
//!
//! # Customers
//! GET  /admin/customers                 - Customers aggregated from orders
//! GET  /admin/customers/detail          - Order history fragment (HTMX)
//! GET  /admin/customers/export.csv      - CSV export
//!
//! # Invoices
//! GET  /admin/invoices                  - Invoice listing
//! GET  /admin/invoices/{id}             - Printable invoice
//!
//! # Settings
//! GET  /admin/settings                  - Settings page
//! POST /admin/settings/password         - Change password
//! POST /admin/settings/language         - Change UI language
//!
//! # Realtime
//! GET  /admin/events                    - SSE stream of order events
//! GET  /admin/api/notifications         - Notification center JSON
//! POST /admin/api/notifications/read    - Mark all read
//! POST /admin/api/notifications/reset   - Reset badge counter
//! ```

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod events;
pub mod invoices;
pub mod orders;
pub mod products;
pub mod settings;

use askama::Template;
use axum::{Router, response::Html};
use chrono::{DateTime, FixedOffset, Utc};
use tower_sessions::Session;

use crate::i18n::{Language, Strings};
use crate::middleware::admin_gate;
use crate::models::{Flash, session};
use crate::state::AppState;

/// Build the admin router. Every `/admin/*` path sits behind the token gate.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(orders::router())
        .merge(products::router())
        .merge(customers::router())
        .merge(invoices::router())
        .merge(settings::router())
        .merge(events::router())
        .layer(axum::middleware::from_fn(admin_gate))
}

/// Data every admin page needs for its chrome (sidebar, top bar, toast).
#[derive(Debug, Clone)]
pub struct Page {
    pub t: &'static Strings,
    pub lang: Language,
    pub username: String,
    pub current_path: &'static str,
    pub flash: Option<Flash>,
}

impl Page {
    /// Load language and pending flash from the session.
    pub async fn load(session: &Session, username: String, current_path: &'static str) -> Self {
        let lang = session::language(session).await;
        Self {
            t: lang.strings(),
            lang,
            username,
            current_path,
            flash: Flash::take(session).await,
        }
    }

    /// Replace the flash with an error (for read failures on this page).
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.flash = Some(Flash::error(message));
        self
    }

    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }
}

/// Render a template, logging failures.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Format a timestamp in the shop timezone.
pub(crate) fn format_datetime(at: DateTime<Utc>, offset: &FixedOffset) -> String {
    at.with_timezone(offset).format("%b %-d, %Y %H:%M").to_string()
}

/// Format a date in the shop timezone.
pub(crate) fn format_date(at: DateTime<Utc>, offset: &FixedOffset) -> String {
    at.with_timezone(offset).format("%b %-d, %Y").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_use_shop_offset() {
        let at = DateTime::parse_from_rfc3339("2025-03-01T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let tunis = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(format_date(at, &tunis), "Mar 2, 2025");
        assert_eq!(format_datetime(at, &tunis), "Mar 2, 2025 00:30");
    }
}
