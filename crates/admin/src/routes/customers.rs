//! Customers aggregated from order history.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::customer::{self, Customer};
use luxeshopy_core::{CURRENCY_CODE, Order};

use crate::db::OrderRepository;
use crate::error::PageError;
use crate::filters;
use crate::i18n::Strings;
use crate::middleware::RequireAdmin;
use crate::routes::{Page, format_date, render};
use crate::state::AppState;

/// Customer row.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub key: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub total_orders: u32,
    pub total_spent: String,
    pub is_paid: bool,
    pub payment_label: &'static str,
    pub last_order: String,
}

impl CustomerView {
    fn new(customer: &Customer, t: &Strings, offset: &FixedOffset) -> Self {
        Self {
            key: customer.key.clone(),
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            total_orders: customer.total_orders,
            total_spent: customer.total_spent.to_string(),
            is_paid: customer.is_paid,
            payment_label: payment_label(customer, t),
            last_order: format_date(customer.last_order, offset),
        }
    }

    /// Query string for the detail fragment.
    #[must_use]
    pub fn detail_url(&self) -> String {
        format!(
            "/admin/customers/detail?key={}",
            urlencoding::encode(&self.key)
        )
    }
}

const fn payment_label(customer: &Customer, t: &Strings) -> &'static str {
    if customer.is_paid { t.paid } else { t.unpaid }
}

/// Search query.
#[derive(Debug, Default, Deserialize)]
pub struct CustomersQuery {
    #[serde(default)]
    pub q: String,
}

/// Detail fragment query.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub key: String,
}

/// Customers page template.
#[derive(Template)]
#[template(path = "customers/list.html")]
pub struct CustomersTemplate {
    pub page: Page,
    pub query: String,
    pub customers: Vec<CustomerView>,
}

/// Order in a customer's history.
#[derive(Debug, Clone)]
pub struct HistoryOrderView {
    pub id: String,
    pub invoice_number: String,
    pub total: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub date: String,
}

/// Customer detail fragment (loaded into a drawer with HTMX).
#[derive(Template)]
#[template(path = "customers/detail.html")]
pub struct CustomerDetailTemplate {
    pub t: &'static Strings,
    pub customer: CustomerView,
    pub orders: Vec<HistoryOrderView>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/customers", get(index))
        .route("/admin/customers/detail", get(detail))
        .route("/admin/customers/export.csv", get(export_csv))
}

async fn load_orders(state: &AppState) -> Result<Vec<Order>, crate::db::RepositoryError> {
    OrderRepository::new(state.pool())
        .list_all()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch orders"))
}

/// Customers page.
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CustomersQuery>,
) -> Html<String> {
    let mut page = Page::load(&session, admin, "/admin/customers").await;
    let orders = load_orders(&state).await.unwrap_or_else(|_| {
        page.flash = Some(crate::models::Flash::error("Failed to load customers"));
        Vec::new()
    });

    let all = customer::aggregate_customers(&orders);
    let offset = state.config().shop_offset;
    let t = page.t;
    let customers = customer::search(&all, &query.q)
        .into_iter()
        .map(|c| CustomerView::new(c, t, &offset))
        .collect();

    render(&CustomersTemplate {
        page,
        query: query.q,
        customers,
    })
}

/// Order history for one customer.
#[instrument(skip(_admin, state, session))]
pub async fn detail(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<DetailQuery>,
) -> Result<Html<String>, PageError> {
    let orders = OrderRepository::new(state.pool())
        .list_all()
        .await
        .map_err(PageError::load("Customer"))?;
    let customers = customer::aggregate_customers(&orders);
    let found = customers
        .iter()
        .find(|c| c.key == query.key)
        .ok_or(PageError::NotFound("Customer"))?;

    let t = crate::models::session::language(&session).await.strings();
    let offset = state.config().shop_offset;
    let history = customer::orders_for(&orders, &query.key)
        .into_iter()
        .map(|o| HistoryOrderView {
            id: o.id.to_string(),
            invoice_number: o.invoice_number(),
            total: o.total_price.to_string(),
            status: t.order_status(o.status),
            status_class: o.status.as_str(),
            date: format_date(o.created_at, &offset),
        })
        .collect();

    Ok(render(&CustomerDetailTemplate {
        t,
        customer: CustomerView::new(found, t, &offset),
        orders: history,
    }))
}

/// Render customers as CSV.
///
/// Columns: Name, Phone, Total Orders, Total Spent (TND), Payment, Last Order.
fn customers_csv(customers: &[Customer], offset: &FixedOffset) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Name",
        "Phone",
        "Total Orders",
        &format!("Total Spent ({CURRENCY_CODE})"),
        "Payment",
        "Last Order",
    ])?;
    for c in customers {
        writer.write_record([
            c.name.as_str(),
            c.phone.as_str(),
            &c.total_orders.to_string(),
            &c.total_spent.amount_string(),
            if c.is_paid { "Paid" } else { "Unpaid" },
            &format_date(c.last_order, offset),
        ])?;
    }
    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

fn export_filename(now: &DateTime<FixedOffset>) -> String {
    format!("customers-{}.csv", now.format("%Y-%m-%d"))
}

/// Download every customer as CSV.
#[instrument(skip(_admin, state))]
pub async fn export_csv(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Response {
    let Ok(orders) = load_orders(&state).await else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to export customers").into_response();
    };
    let customers = customer::aggregate_customers(&orders);

    match customers_csv(&customers, &state.config().shop_offset) {
        Ok(body) => {
            tracing::info!(count = customers.len(), "Customers exported");
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!(
                            "attachment; filename=\"{}\"",
                            export_filename(&state.shop_now())
                        ),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to write customers CSV");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to export customers").into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use luxeshopy_core::Price;

    fn customer(name: &str, phone: &str, paid: bool) -> Customer {
        Customer {
            key: phone.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            address: String::new(),
            total_orders: 2,
            total_spent: Price::from_dinars(750),
            is_paid: paid,
            last_order: Utc.with_ymd_and_hms(2025, 5, 4, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_csv_has_header_and_quotes_commas() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let bytes = customers_csv(
            &[
                customer("Amira", "22123456", true),
                customer("Ben Ali, Sami", "", false),
            ],
            &offset,
        )
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Name,Phone,Total Orders,Total Spent (TND),Payment,Last Order"
        );
        assert_eq!(lines[1], "Amira,22123456,2,750.00,Paid,\"May 4, 2025\"");
        assert!(lines[2].starts_with("\"Ben Ali, Sami\",,2,750.00,Unpaid"));
    }

    #[test]
    fn test_export_filename_uses_shop_date() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let now = Utc
            .with_ymd_and_hms(2025, 12, 31, 23, 30, 0)
            .unwrap()
            .with_timezone(&offset);
        assert_eq!(export_filename(&now), "customers-2026-01-01.csv");
    }

    #[test]
    fn test_detail_url_encodes_key() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let mut c = customer("Amira", "", true);
        c.key = "Amira B".to_string();
        let view = CustomerView::new(&c, crate::i18n::Language::En.strings(), &offset);
        assert_eq!(view.detail_url(), "/admin/customers/detail?key=Amira%20B");
    }
}
