//! Storefront request errors.
//!
//! Grid pages degrade to an empty list with a notice, and checkout and
//! contact re-render their forms. What is left fails with [`AppError`]: a
//! product page or cart add for an unknown product, a catalog read that the
//! handler cannot do without, and session writes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;

/// Shopper-facing text for server errors. Details go to Sentry only.
pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors a storefront handler can end with.
#[derive(Debug, Error)]
pub enum AppError {
    /// No product has this id, or the id is malformed.
    #[error("product {0} not found")]
    ProductNotFound(String),

    /// The catalog or order store failed.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    /// The shopper's session (and with it the cart) could not be saved.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::ProductNotFound(id) => {
                tracing::debug!(product_id = %id, "Unknown product requested");
                (StatusCode::NOT_FOUND, "Product not found").into_response()
            }
            Self::Store(_) | Self::Session(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(error = %self, sentry_event_id = %event_id, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE).into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Record a shopper action (cart, checkout, contact) as a Sentry breadcrumb,
/// so a later error report shows what the shopper did before it.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }
    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let response = AppError::ProductNotFound("abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(response).await, "Product not found");
    }

    #[tokio::test]
    async fn test_store_failure_hides_details() {
        let err = AppError::from(RepositoryError::DataCorruption("order items: bad".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(response).await, SERVER_ERROR_MESSAGE);
    }
}
