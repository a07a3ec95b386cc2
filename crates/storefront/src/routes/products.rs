//! Product detail and quick-view handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::Chrome;
use crate::state::AppState;

/// Product detail display data.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<&'static str>,
    pub color: Option<String>,
    pub sizes: Vec<i32>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            price: product.price.to_string(),
            compare_at_price: product
                .is_on_sale()
                .then(|| product.compare_at_price.to_string()),
            discount_percent: product.discount_percent(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            category: product.category.map(|c| c.label()),
            color: product.color.clone(),
            sizes: product.sizes.clone(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: Chrome,
    pub product: ProductDetailView,
}

/// Quick view modal fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/quick_view.html")]
pub struct QuickViewTemplate {
    pub product: ProductDetailView,
}

/// Look up a product from a path segment. Malformed ids are simply not found.
async fn find_product(state: &AppState, id: &str) -> Result<Product> {
    let not_found = || AppError::ProductNotFound(id.to_string());
    let product_id = id.parse::<ProductId>().map_err(|_| not_found())?;
    state
        .catalog()
        .product(product_id)
        .await?
        .ok_or_else(not_found)
}

/// Display product detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product = find_product(&state, &id).await?;
    let chrome = Chrome::load(&state, &session, "shop").await;

    Ok(ProductShowTemplate {
        chrome,
        product: ProductDetailView::from(&product),
    })
}

/// Quick view fragment for the product grid.
#[instrument(skip(state))]
pub async fn quick_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product = find_product(&state, &id).await?;
    Ok(QuickViewTemplate {
        product: ProductDetailView::from(&product),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::routes::tests::product;
    use luxeshopy_core::{Category, Price};

    #[test]
    fn test_detail_view() {
        let mut p = product("Velvet Loafer", 450, Some(Category::Women));
        p.compare_at_price = Price::from_dinars(500);
        let view = ProductDetailView::from(&p);
        assert_eq!(view.price, "450.00 TND");
        assert_eq!(view.discount_percent, Some(10));
        assert_eq!(view.category, Some("Women"));
        assert_eq!(view.sizes, vec![39, 40, 41, 42]);
    }

    #[test]
    fn test_quick_view_renders_sizes() {
        let p = product("Velvet Loafer", 450, Some(Category::Women));
        let html = QuickViewTemplate {
            product: ProductDetailView::from(&p),
        }
        .render()
        .unwrap();
        assert!(html.contains("Velvet Loafer"));
        assert!(html.contains("41"));
        assert!(html.contains(&format!("/products/{}", p.id)));
    }
}
