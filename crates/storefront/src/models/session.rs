//! The shopper's cart, kept in the session.
//!
//! The whole [`Cart`] is serialized under one key. A cart that fails to
//! deserialize (for example after a schema change) is treated as empty.

use tower_sessions::Session;

use luxeshopy_core::Cart;

/// Session keys used by the storefront.
pub mod session_keys {
    /// The shopper's cart.
    pub const CART: &str = "cart";
}

/// Load the cart from the session, empty if missing or unreadable.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable session cart");
            Cart::new()
        }
    }
}

/// Store the cart in the session. An empty cart removes the key.
///
/// # Errors
///
/// Returns the session error if the store rejects the write.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    if cart.is_empty() {
        session.remove_value(session_keys::CART).await?;
        return Ok(());
    }
    session.insert(session_keys::CART, cart).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use luxeshopy_core::{ImageSource, Price, Product, ProductId};
    use tower_sessions::MemoryStore;

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::random(),
            title: "Nike Air Max (Red)".to_string(),
            price: Price::from_dinars(549),
            description: String::new(),
            image_url: None,
            sizes: vec![42],
            color: Some("Red".to_string()),
            category: None,
            cost_price: Price::ZERO,
            compare_at_price: Price::ZERO,
            image_source: ImageSource::Url,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_cart_round_trips_through_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert!(load_cart(&session).await.is_empty());

        let mut cart = Cart::new();
        cart.add(&product(), Some(42), Some("Red"));
        save_cart(&session, &cart).await.unwrap();
        assert_eq!(load_cart(&session).await, cart);

        cart.clear();
        save_cart(&session, &cart).await.unwrap();
        assert!(load_cart(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_cart_is_empty() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session.insert(session_keys::CART, "not a cart").await.unwrap();
        assert!(load_cart(&session).await.is_empty());
    }
}
