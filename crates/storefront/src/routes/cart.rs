//! Cart route handlers.
//!
//! The cart lives in the session (see [`crate::models::session`]). Mutations
//! answer htmx requests with fragments and an `HX-Trigger: cart-updated`
//! header so the navigation badge refreshes; plain form posts are redirected
//! back to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::{Cart, CartLine, Product, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::{load_cart, save_cart};
use crate::routes::{Chrome, is_htmx};
use crate::state::AppState;

const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub line_id: String,
    pub product_id: String,
    pub title: String,
    pub price: String,
    pub quantity: u32,
    /// Quantities posted by the minus and plus buttons.
    pub quantity_down: i64,
    pub quantity_up: i64,
    pub size: Option<i32>,
    pub color: Option<String>,
    pub image_url: Option<String>,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            line_id: line.line_id.clone(),
            product_id: line.product_id.to_string(),
            title: line.title.clone(),
            price: line.price.to_string(),
            quantity: line.quantity,
            quantity_down: i64::from(line.quantity) - 1,
            quantity_up: i64::from(line.quantity) + 1,
            size: line.size,
            color: line.color.clone(),
            image_url: line.image_url.clone(),
            line_price: line.subtotal().to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: cart.total_price().to_string(),
            item_count: cart.total_items(),
        }
    }
}

/// Add to cart form data.
///
/// Product cards post only `product_id`. The product page always posts a
/// `size` field, which must then name one of the product's sizes.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: Chrome,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Size and color to add, checked against the product.
///
/// A missing `size` field means the request came from a product card and the
/// line is added without size or color.
fn resolve_selection(
    product: &Product,
    size: Option<&str>,
    color: Option<&str>,
) -> std::result::Result<(Option<i32>, Option<String>), &'static str> {
    let Some(size) = size else {
        return Ok((None, None));
    };
    let size = size
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|s| product.has_size(*s))
        .ok_or("Please select a size")?;

    let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
        None => product.color.clone(),
        Some(c) if product.color.as_deref().is_some_and(|pc| pc.eq_ignore_ascii_case(c)) => {
            product.color.clone()
        }
        Some(_) => return Err("Please select a color"),
    };

    Ok((Some(size), color))
}

/// Fragment for line mutations, or a redirect for plain form posts.
fn items_response(headers: &HeaderMap, cart: &Cart) -> Response {
    if !is_htmx(headers) {
        return Redirect::to("/cart").into_response();
    }
    (
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let chrome = Chrome::load(&state, &session, "cart").await;
    let cart = load_cart(&session).await;

    CartShowTemplate {
        chrome,
        cart: CartView::from(&cart),
    }
}

/// Add one unit of a product to the cart.
///
/// Returns the count badge with an HTMX trigger so other elements refresh.
/// Selection errors come back as 422 with the message as plain text.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let not_found = || AppError::ProductNotFound(form.product_id.clone());
    let id = form.product_id.parse::<ProductId>().map_err(|_| not_found())?;
    let product = state.catalog().product(id).await?.ok_or_else(not_found)?;

    let (size, color) =
        match resolve_selection(&product, form.size.as_deref(), form.color.as_deref()) {
            Ok(selection) => selection,
            Err(message) => return Ok((StatusCode::UNPROCESSABLE_ENTITY, message).into_response()),
        };

    let mut cart = load_cart(&session).await;
    cart.add(&product, size, color.as_deref());
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", &form.product_id)]),
    );
    tracing::info!(product_id = %product.id, ?size, items = cart.total_items(), "Added to cart");

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/cart").into_response());
    }
    Ok((
        AppendHeaders([CART_UPDATED]),
        CartCountTemplate {
            count: cart.total_items(),
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX). Zero or less removes the line.
#[instrument(skip(session, headers))]
pub async fn update(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.update_quantity(&form.line_id, form.quantity);
    save_cart(&session, &cart).await?;

    Ok(items_response(&headers, &cart))
}

/// Remove item from cart (HTMX).
#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.remove(&form.line_id);
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Removed from cart", Some(&[("line_id", &form.line_id)]));
    Ok(items_response(&headers, &cart))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.total_items(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::routes::tests::product;
    use luxeshopy_core::Category;

    #[test]
    fn test_card_add_has_no_selection() {
        let p = product("Air Runner", 549, Some(Category::Men));
        assert_eq!(resolve_selection(&p, None, None), Ok((None, None)));
    }

    #[test]
    fn test_detail_add_requires_known_size() {
        let p = product("Air Runner", 549, Some(Category::Men));
        assert_eq!(
            resolve_selection(&p, Some(""), None),
            Err("Please select a size")
        );
        assert_eq!(
            resolve_selection(&p, Some("47"), None),
            Err("Please select a size")
        );
        assert_eq!(
            resolve_selection(&p, Some("41"), None),
            Ok((Some(41), Some("Black".to_string())))
        );
    }

    #[test]
    fn test_detail_add_color_must_match() {
        let p = product("Air Runner", 549, Some(Category::Men));
        assert_eq!(
            resolve_selection(&p, Some("40"), Some("black")),
            Ok((Some(40), Some("Black".to_string())))
        );
        assert_eq!(
            resolve_selection(&p, Some("40"), Some("Green")),
            Err("Please select a color")
        );
    }

    #[test]
    fn test_cart_view_totals() {
        let p = product("Air Runner", 549, Some(Category::Men));
        let mut cart = Cart::new();
        cart.add(&p, Some(42), Some("Black"));
        cart.add(&p, Some(42), Some("Black"));
        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "1098.00 TND");
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].line_price, "1098.00 TND");
    }

    #[test]
    fn test_items_response_redirects_plain_posts() {
        let cart = Cart::new();
        let response = items_response(&HeaderMap::new(), &cart);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let mut headers = HeaderMap::new();
        headers.insert("hx-request", "true".parse().unwrap());
        let response = items_response(&headers, &cart);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("HX-Trigger").unwrap(), "cart-updated");
    }

    #[test]
    fn test_count_fragment() {
        let html = CartCountTemplate { count: 2 }.render().unwrap();
        assert_eq!(html.trim(), r#"<span class="cart-count">2</span>"#);
        let html = CartCountTemplate { count: 0 }.render().unwrap();
        assert!(html.trim().is_empty());
    }
}
