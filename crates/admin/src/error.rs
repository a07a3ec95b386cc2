//! Errors for admin pages that cannot degrade to a toast.
//!
//! List pages render with empty data and a toast when a read fails. A detail
//! page (an order, an invoice, a product form, a customer's history) has
//! nothing to show without its record, so it answers with [`PageError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;

/// A detail page that could not be rendered.
#[derive(Debug, Error)]
pub enum PageError {
    /// No record matches the path, or the id in it is malformed.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The store failed while loading the record.
    #[error("Failed to load {}", .what.to_lowercase())]
    Load {
        what: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl PageError {
    /// `map_err` adapter for repository reads.
    pub fn load(what: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| Self::Load { what, source }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Load { what, source } => {
                let event_id = sentry::capture_error(source);
                tracing::error!(
                    record = what,
                    error = %source,
                    sentry_event_id = %event_id,
                    "Failed to load admin page"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

/// Set the Sentry user context from the admin username.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_record() {
        assert_eq!(PageError::NotFound("Invoice").to_string(), "Invoice not found");
        let err = PageError::load("Order")(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "Failed to load order");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PageError::NotFound("Product").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PageError::load("Product")(RepositoryError::Conflict("dup".to_string()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
