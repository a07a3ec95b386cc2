//! Checkout: delivery form, order placement and confirmation.
//!
//! Payment is cash on delivery, so placing an order only records it as
//! pending and unpaid. The cart is cleared once the insert succeeds.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::{CheckoutForm, OrderId, order::GOVERNORATES};

use crate::db::{OrderRepository, orders::OrderConfirmation};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::{load_cart, save_cart};
use crate::routes::Chrome;
use crate::routes::cart::CartView;
use crate::state::AppState;

const ORDER_FAILED: &str = "Failed to place order.";

/// Checkout page template. An empty cart renders the "Go to Shop" state.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub chrome: Chrome,
    pub cart: CartView,
    pub form: CheckoutForm,
    pub governorates: &'static [&'static str],
    pub error: Option<String>,
}

impl CheckoutTemplate {
    #[must_use]
    pub fn is_selected(&self, governorate: &str) -> bool {
        self.form.governorate.trim() == governorate
    }
}

/// Order summary for the confirmation page.
#[derive(Debug, Clone)]
pub struct ConfirmationView {
    pub invoice_number: String,
    pub customer_name: String,
    pub total: String,
    pub item_count: u32,
    pub placed_on: String,
}

impl From<&OrderConfirmation> for ConfirmationView {
    fn from(order: &OrderConfirmation) -> Self {
        Self {
            invoice_number: order.invoice_number(),
            customer_name: order.customer_name.clone(),
            total: order.total_price.to_string(),
            item_count: order.item_count,
            placed_on: order.created_at.format("%d/%m/%Y").to_string(),
        }
    }
}

/// Confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub chrome: Chrome,
    pub order_id: Option<String>,
    pub order: Option<ConfirmationView>,
}

/// Confirmation page query parameters.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

/// Display the checkout form.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let chrome = Chrome::load(&state, &session, "checkout").await;
    let cart = load_cart(&session).await;

    CheckoutTemplate {
        chrome,
        cart: CartView::from(&cart),
        form: CheckoutForm::default(),
        governorates: &GOVERNORATES,
        error: None,
    }
}

/// Validate the delivery details and place the order.
///
/// Validation failures re-render the form with 422 and the entered values.
#[instrument(skip(state, session, form), fields(governorate = %form.governorate))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;

    let rerender = |chrome: Chrome, cart: CartView, form: CheckoutForm, error: String| CheckoutTemplate {
        chrome,
        cart,
        form,
        governorates: &GOVERNORATES,
        error: Some(error),
    };

    let order = match form.validate(&cart) {
        Ok(order) => order,
        Err(e) => {
            tracing::debug!(error = %e, "Checkout rejected");
            let chrome = Chrome::load(&state, &session, "checkout").await;
            let page = rerender(chrome, CartView::from(&cart), form, e.to_string());
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let order_id = match OrderRepository::new(state.pool()).create(&order).await {
        Ok(id) => id,
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Failed to place order");
            let chrome = Chrome::load(&state, &session, "checkout").await;
            let page = rerender(chrome, CartView::from(&cart), form, ORDER_FAILED.to_string());
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, page).into_response());
        }
    };

    cart.clear();
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", &order_id.to_string())]),
    );
    tracing::info!(
        order_id = %order_id,
        total = %order.total_price,
        lines = order.items.len(),
        "Order placed"
    );

    Ok(Redirect::to(&format!("/checkout/success?orderId={order_id}")).into_response())
}

/// Order confirmation page.
#[instrument(skip(state, session))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SuccessQuery>,
) -> Result<impl IntoResponse> {
    let chrome = Chrome::load(&state, &session, "checkout").await;
    let order_id = query
        .order_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let order = match order_id.as_deref().map(str::parse::<OrderId>) {
        Some(Ok(id)) => OrderRepository::new(state.pool())
            .confirmation(id)
            .await?
            .as_ref()
            .map(ConfirmationView::from),
        _ => None,
    };

    Ok(SuccessTemplate {
        chrome,
        order_id,
        order,
    })
}
