//! Order listing, detail and status updates.
//!
//! Status and payment updates answer with the `{success, data?, error?}`
//! envelope; the orders page posts them from a `<select>` and shows the
//! result as a toast.

use askama::Template;
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::FixedOffset;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::{ActionResult, Order, OrderId, OrderStatus, PaymentStatus};

use crate::db::{OrderRepository, RepositoryError};
use crate::error::PageError;
use crate::filters;
use crate::i18n::Strings;
use crate::middleware::RequireAdmin;
use crate::middleware::auth::admin_from_headers;
use crate::routes::{Page, format_datetime, render};
use crate::state::AppState;

/// A choice in a status `<select>`.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn status_options(current: OrderStatus, t: &Strings) -> Vec<OptionView> {
    OrderStatus::SELECTABLE
        .iter()
        .map(|s| OptionView {
            value: s.as_str(),
            label: t.order_status(*s),
            selected: *s == current,
        })
        .collect()
}

fn payment_options(current: PaymentStatus, t: &Strings) -> Vec<OptionView> {
    [PaymentStatus::Paid, PaymentStatus::Unpaid]
        .iter()
        .map(|s| OptionView {
            value: s.as_str(),
            label: t.payment_status(*s),
            selected: *s == current,
        })
        .collect()
}

/// Order row for the list.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: String,
    pub invoice_number: String,
    pub customer_name: String,
    pub phone: String,
    pub total: String,
    pub item_count: u32,
    pub date: String,
    pub status_class: &'static str,
    pub status_options: Vec<OptionView>,
    pub payment_class: &'static str,
    pub payment_options: Vec<OptionView>,
}

impl OrderRowView {
    fn new(order: &Order, t: &Strings, offset: &FixedOffset) -> Self {
        Self {
            id: order.id.to_string(),
            invoice_number: order.invoice_number(),
            customer_name: order.display_name().to_string(),
            phone: order.phone.clone().unwrap_or_default(),
            total: order.total_price.to_string(),
            item_count: order.item_count(),
            date: format_datetime(order.created_at, offset),
            status_class: order.status.as_str(),
            status_options: status_options(order.status, t),
            payment_class: order.payment_status.as_str(),
            payment_options: payment_options(order.payment_status, t),
        }
    }
}

/// Line item on the detail page.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub title: String,
    pub image: Option<String>,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
}

/// Order detail view.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub row: OrderRowView,
    pub address: String,
    pub items: Vec<OrderItemView>,
}

impl OrderDetailView {
    fn new(order: &Order, t: &Strings, offset: &FixedOffset) -> Self {
        Self {
            row: OrderRowView::new(order, t, offset),
            address: order.address.clone().unwrap_or_default(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    title: item.title.clone(),
                    image: item.image.clone(),
                    size: item.size.map(|s| s.to_string()).unwrap_or_default(),
                    color: item.color.clone().unwrap_or_default(),
                    quantity: item.quantity,
                    unit_price: item.price.to_string(),
                    subtotal: item.subtotal().to_string(),
                })
                .collect(),
        }
    }
}

/// Filter for the orders list.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// A status filter tab.
#[derive(Debug, Clone)]
pub struct FilterTab {
    pub value: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Orders list template.
#[derive(Template)]
#[template(path = "orders/list.html")]
pub struct OrdersListTemplate {
    pub page: Page,
    pub tabs: Vec<FilterTab>,
    pub orders: Vec<OrderRowView>,
}

/// Order detail template.
#[derive(Template)]
#[template(path = "orders/detail.html")]
pub struct OrderDetailTemplate {
    pub page: Page,
    pub order: OrderDetailView,
}

/// Status update form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Payment update form.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub payment_status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(index))
        .route("/admin/orders/{id}", get(show))
        .route("/admin/orders/{id}/status", post(update_status))
        .route("/admin/orders/{id}/payment", post(update_payment))
}

/// Orders list page.
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrdersQuery>,
) -> Html<String> {
    let mut page = Page::load(&session, admin, "/admin/orders").await;
    let filter = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty() && *s != "all")
        .and_then(|s| s.parse::<OrderStatus>().ok());

    let orders = OrderRepository::new(state.pool())
        .list_all()
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch orders");
            page.flash = Some(crate::models::Flash::error("Failed to load orders"));
            Vec::new()
        });

    let offset = state.config().shop_offset;
    let t = page.t;
    let rows = orders
        .iter()
        .filter(|o| filter.is_none_or(|f| o.status == f))
        .map(|o| OrderRowView::new(o, t, &offset))
        .collect();

    let mut tabs = vec![FilterTab {
        value: "all",
        label: t.all_orders,
        active: filter.is_none(),
    }];
    tabs.extend(OrderStatus::SELECTABLE.iter().map(|s| FilterTab {
        value: s.as_str(),
        label: t.order_status(*s),
        active: filter == Some(*s),
    }));

    render(&OrdersListTemplate {
        page,
        tabs,
        orders: rows,
    })
}

/// Order detail page.
#[instrument(skip(admin, state, session))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let order_id = id
        .parse::<OrderId>()
        .map_err(|_| PageError::NotFound("Order"))?;
    let order = OrderRepository::new(state.pool())
        .get_by_id(order_id)
        .await
        .map_err(PageError::load("Order"))?
        .ok_or(PageError::NotFound("Order"))?;

    let page = Page::load(&session, admin, "/admin/orders").await;
    let view = OrderDetailView::new(&order, page.t, &state.config().shop_offset);
    Ok(render(&OrderDetailTemplate { page, order: view }))
}

/// Reasons a status update fails, in the order they are checked.
#[derive(Debug, thiserror::Error)]
pub enum StatusUpdateError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid status")]
    InvalidStatus,
    #[error("Order not found or update failed")]
    NotFoundOrFailed,
}

/// Check the session, then parse the requested status.
///
/// Every stored status is accepted, legacy `paid` included; the order
/// screens only offer the selectable ones.
fn validate_update(authenticated: bool, raw: &str) -> Result<OrderStatus, StatusUpdateError> {
    if !authenticated {
        return Err(StatusUpdateError::Unauthorized);
    }
    raw.parse::<OrderStatus>()
        .map_err(|_| StatusUpdateError::InvalidStatus)
}

fn envelope_response(result: ActionResult<&'static str>) -> Response {
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(result)).into_response()
}

/// Update an order's status.
#[instrument(skip(state, headers, form))]
pub async fn update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    let result: Result<&'static str, StatusUpdateError> = async {
        let status = validate_update(admin_from_headers(&headers).is_some(), &form.status)?;
        let order_id = id
            .parse::<OrderId>()
            .map_err(|_| StatusUpdateError::NotFoundOrFailed)?;

        OrderRepository::new(state.pool())
            .update_status(order_id, status)
            .await
            .map_err(|e| {
                if !matches!(e, RepositoryError::NotFound) {
                    tracing::error!(order_id = %order_id, error = %e, "Failed to update status");
                }
                StatusUpdateError::NotFoundOrFailed
            })?;

        tracing::info!(order_id = %order_id, status = %status, "Order status updated");
        Ok(status.as_str())
    }
    .await;

    envelope_response(result.into())
}

/// Update an order's payment status.
#[instrument(skip(state, headers, form))]
pub async fn update_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<PaymentForm>,
) -> Response {
    if admin_from_headers(&headers).is_none() {
        return envelope_response(ActionResult::err("Unauthorized"));
    }
    let Ok(payment) = form.payment_status.parse::<PaymentStatus>() else {
        return envelope_response(ActionResult::err("Invalid payment status"));
    };
    let Ok(order_id) = id.parse::<OrderId>() else {
        return envelope_response(ActionResult::err("Order not found"));
    };

    match OrderRepository::new(state.pool())
        .update_payment_status(order_id, payment)
        .await
    {
        Ok(()) => {
            tracing::info!(order_id = %order_id, payment = %payment, "Payment status updated");
            envelope_response(ActionResult::ok(payment.as_str()))
        }
        Err(RepositoryError::NotFound) => envelope_response(ActionResult::err("Order not found")),
        Err(e) => {
            tracing::error!(order_id = %order_id, error = %e, "Failed to update payment status");
            envelope_response(ActionResult::err("Order not found"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::i18n::Language;

    #[test]
    fn test_status_update_accepts_every_stored_status() {
        assert_eq!(validate_update(true, "Shipped").unwrap(), OrderStatus::Shipped);
        assert_eq!(validate_update(true, "paid").unwrap(), OrderStatus::Paid);
        assert!(matches!(
            validate_update(true, "lost"),
            Err(StatusUpdateError::InvalidStatus)
        ));
    }

    #[test]
    fn test_status_update_checks_session_first() {
        assert!(matches!(
            validate_update(false, "lost"),
            Err(StatusUpdateError::Unauthorized)
        ));
        assert!(matches!(
            validate_update(false, "shipped"),
            Err(StatusUpdateError::Unauthorized)
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(StatusUpdateError::InvalidStatus.to_string(), "Invalid status");
        assert_eq!(StatusUpdateError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(
            StatusUpdateError::NotFoundOrFailed.to_string(),
            "Order not found or update failed"
        );
    }

    #[test]
    fn test_status_options_mark_current() {
        let options = status_options(OrderStatus::Delivered, Language::En.strings());
        assert_eq!(options.len(), 4);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value, "delivered");
    }

    #[test]
    fn test_legacy_paid_status_selects_nothing() {
        let options = status_options(OrderStatus::Paid, Language::En.strings());
        assert!(options.iter().all(|o| !o.selected));
    }
}
