//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                            - Home page (seeds the example catalog when empty)
//! GET  /shop                        - Search, category tabs and sort (q, category, sort)
//! GET  /category/{name}             - Men's / Women's collection
//!
//! # Products
//! GET  /products/{id}               - Product detail
//! GET  /products/{id}/quick-view    - Quick view fragment (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                        - Cart page
//! POST /cart/add                    - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update                 - Update quantity (returns cart_items fragment)
//! POST /cart/remove                 - Remove line (returns cart_items fragment)
//! GET  /cart/count                  - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                    - Delivery form
//! POST /checkout                    - Validate and place the order
//! GET  /checkout/success?orderId=   - Confirmation
//!
//! # Contact
//! GET  /contact                     - Contact form
//! POST /contact                     - Store the message
//! ```

pub mod cart;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod products;
pub mod shop;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};
use tower_sessions::Session;

use luxeshopy_core::Product;

use crate::middleware::{cart_rate_limiter, form_rate_limiter};
use crate::models::load_cart;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/quick-view", get(products::quick_view))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .layer(cart_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(checkout::show).merge(post(checkout::submit).layer(form_rate_limiter())),
        )
        .route("/success", get(checkout::success))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/shop", get(shop::shop))
        .route("/category/{name}", get(shop::category))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route(
            "/contact",
            get(contact::show).merge(post(contact::submit).layer(form_rate_limiter())),
        )
}

// =============================================================================
// Shared View Data
// =============================================================================

/// Data the layout needs on every page: navigation, cart badge, chat button.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub nav: &'static str,
    pub cart_count: u32,
    pub whatsapp_link: Option<String>,
}

impl Chrome {
    pub async fn load(state: &AppState, session: &Session, nav: &'static str) -> Self {
        Self {
            nav,
            cart_count: load_cart(session).await.total_items(),
            whatsapp_link: state.whatsapp_link().map(String::from),
        }
    }

    #[must_use]
    pub fn is_nav(&self, name: &str) -> bool {
        self.nav == name
    }
}

/// Product card data for grids.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub image_url: Option<String>,
    pub category: Option<&'static str>,
    pub color: Option<String>,
    /// First three sizes, with an ellipsis when there are more.
    pub sizes_preview: Option<String>,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let sizes_preview = (!product.sizes.is_empty()).then(|| {
            let shown: Vec<String> = product.sizes.iter().take(3).map(ToString::to_string).collect();
            let more = if product.sizes.len() > 3 { "..." } else { "" };
            format!("{}{more}", shown.join(", "))
        });

        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            price: product.price.to_string(),
            compare_at_price: product
                .is_on_sale()
                .then(|| product.compare_at_price.to_string()),
            discount_percent: product.discount_percent(),
            image_url: product.image_url.clone(),
            category: product.category.map(|c| c.label()),
            color: product.color.clone(),
            sizes_preview,
        }
    }
}

/// Whether the request came from htmx (as opposed to a plain form post).
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use chrono::Utc;
    use luxeshopy_core::{Category, ImageSource, Price, ProductId};

    use super::*;

    pub(crate) fn product(title: &str, price: i64, category: Option<Category>) -> Product {
        Product {
            id: ProductId::random(),
            title: title.to_string(),
            price: Price::from_dinars(price),
            description: "Hand-finished leather.".to_string(),
            image_url: Some("https://images.example.com/shoe.jpg".to_string()),
            sizes: vec![39, 40, 41, 42],
            color: Some("Black".to_string()),
            category,
            cost_price: Price::ZERO,
            compare_at_price: Price::ZERO,
            image_source: ImageSource::Url,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_card_view() {
        let mut p = product("Velvet Loafer", 450, Some(Category::Men));
        p.compare_at_price = Price::from_dinars(600);
        let card = ProductCardView::from(&p);
        assert_eq!(card.price, "450.00 TND");
        assert_eq!(card.compare_at_price.as_deref(), Some("600.00 TND"));
        assert_eq!(card.discount_percent, Some(25));
        assert_eq!(card.category, Some("Men"));
        assert_eq!(card.sizes_preview.as_deref(), Some("39, 40, 41..."));
    }

    #[test]
    fn test_card_view_without_sizes_or_sale() {
        let mut p = product("Silk Pump", 799, None);
        p.sizes = vec![38];
        let card = ProductCardView::from(&p);
        assert_eq!(card.compare_at_price, None);
        assert_eq!(card.discount_percent, None);
        assert_eq!(card.sizes_preview.as_deref(), Some("38"));
        p.sizes.clear();
        assert_eq!(ProductCardView::from(&p).sizes_preview, None);
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("HX-Request", "true".parse().unwrap());
        assert!(is_htmx(&headers));
    }
}
