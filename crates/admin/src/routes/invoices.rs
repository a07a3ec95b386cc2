//! Invoices: one per order, rendered as a printable page.

use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::Html,
    routing::get,
};
use chrono::FixedOffset;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::{Order, OrderId};

use crate::db::OrderRepository;
use crate::error::PageError;
use crate::filters;
use crate::i18n::{Language, Strings};
use crate::middleware::RequireAdmin;
use crate::models::session;
use crate::routes::{Page, format_date, render};
use crate::state::AppState;

pub const SHOP_NAME: &str = "LuxeShopy";
pub const SHOP_TAGLINE: &str = "Premium Luxury Footwear";
pub const INVOICE_FOOTER: &str = "Thank you for choosing LuxeShopy. Experience Excellence.";

/// Invoice row in the listing.
#[derive(Debug, Clone)]
pub struct InvoiceRowView {
    pub id: String,
    pub invoice_number: String,
    pub customer_name: String,
    pub total: String,
    pub payment: &'static str,
    pub payment_class: &'static str,
    pub date: String,
}

impl InvoiceRowView {
    fn new(order: &Order, t: &Strings, offset: &FixedOffset) -> Self {
        Self {
            id: order.id.to_string(),
            invoice_number: order.invoice_number(),
            customer_name: order.display_name().to_string(),
            total: order.total_price.to_string(),
            payment: t.payment_status(order.payment_status),
            payment_class: order.payment_status.as_str(),
            date: format_date(order.created_at, offset),
        }
    }
}

/// Match an invoice number, customer name or phone.
fn matches_invoice(order: &Order, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let lower = term.to_lowercase();
    order.invoice_number().to_lowercase().contains(&lower)
        || order.customer_name.to_lowercase().contains(&lower)
        || order.phone.as_deref().is_some_and(|p| p.contains(term))
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoicesQuery {
    #[serde(default)]
    pub q: String,
}

/// Invoice list template.
#[derive(Template)]
#[template(path = "invoices/list.html")]
pub struct InvoicesTemplate {
    pub page: Page,
    pub query: String,
    pub invoices: Vec<InvoiceRowView>,
}

/// Invoice line.
#[derive(Debug, Clone)]
pub struct InvoiceLineView {
    pub title: String,
    pub details: String,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
}

/// Printable invoice. Standalone page without the admin chrome.
#[derive(Template)]
#[template(path = "invoices/print.html")]
pub struct InvoicePrintTemplate {
    pub t: &'static Strings,
    pub lang: Language,
    pub shop_name: &'static str,
    pub tagline: &'static str,
    pub footer: &'static str,
    pub invoice_number: String,
    pub date: String,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub status: &'static str,
    pub payment: &'static str,
    pub lines: Vec<InvoiceLineView>,
    pub total: String,
}

impl InvoicePrintTemplate {
    fn new(order: &Order, lang: Language, offset: &FixedOffset) -> Self {
        let t = lang.strings();
        Self {
            t,
            lang,
            shop_name: SHOP_NAME,
            tagline: SHOP_TAGLINE,
            footer: INVOICE_FOOTER,
            invoice_number: order.invoice_number(),
            date: format_date(order.created_at, offset),
            customer_name: order.display_name().to_string(),
            phone: order.phone.clone().unwrap_or_default(),
            address: order.address.clone().unwrap_or_default(),
            status: t.order_status(order.status),
            payment: t.payment_status(order.payment_status),
            lines: order
                .items
                .iter()
                .map(|item| {
                    let details = [
                        item.size.map(|s| format!("{s}")),
                        item.color.clone(),
                    ]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" / ");
                    InvoiceLineView {
                        title: item.title.clone(),
                        details,
                        quantity: item.quantity,
                        unit_price: item.price.to_string(),
                        subtotal: item.subtotal().to_string(),
                    }
                })
                .collect(),
            total: order.total_price.to_string(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/invoices", get(index))
        .route("/admin/invoices/{id}", get(show))
}

/// Invoice list page.
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<InvoicesQuery>,
) -> Html<String> {
    let mut page = Page::load(&session, admin, "/admin/invoices").await;
    let orders = OrderRepository::new(state.pool())
        .list_all()
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch orders");
            page.flash = Some(crate::models::Flash::error("Failed to load invoices"));
            Vec::new()
        });

    let offset = state.config().shop_offset;
    let t = page.t;
    let invoices = orders
        .iter()
        .filter(|o| matches_invoice(o, &query.q))
        .map(|o| InvoiceRowView::new(o, t, &offset))
        .collect();

    render(&InvoicesTemplate {
        page,
        query: query.q,
        invoices,
    })
}

/// Printable invoice for one order.
#[instrument(skip(_admin, state, session))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let order_id = id
        .parse::<OrderId>()
        .map_err(|_| PageError::NotFound("Invoice"))?;
    let order = OrderRepository::new(state.pool())
        .get_by_id(order_id)
        .await
        .map_err(PageError::load("Invoice"))?
        .ok_or(PageError::NotFound("Invoice"))?;

    let lang = session::language(&session).await;
    Ok(render(&InvoicePrintTemplate::new(
        &order,
        lang,
        &state.config().shop_offset,
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use luxeshopy_core::{OrderItem, OrderStatus, PaymentStatus, Price, ProductId};

    fn order() -> Order {
        Order {
            id: OrderId::random(),
            customer_name: "Amira Ben Salah".to_string(),
            phone: Some("22123456".to_string()),
            address: Some("5 Rue de Marseille, Tunis, Tunis".to_string()),
            total_price: Price::from_dinars(1098),
            items: vec![OrderItem {
                product_id: ProductId::random(),
                title: "Nike Air Max (Red)".to_string(),
                price: Price::from_dinars(549),
                quantity: 2,
                size: Some(42),
                color: Some("Red".to_string()),
                image: None,
            }],
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_search_matches_invoice_name_and_phone() {
        let o = order();
        let number = o.invoice_number();
        assert!(matches_invoice(&o, ""));
        assert!(matches_invoice(&o, &number.to_lowercase()));
        assert!(matches_invoice(&o, "amira"));
        assert!(matches_invoice(&o, "2212"));
        assert!(!matches_invoice(&o, "Karim"));
    }

    #[test]
    fn test_print_lines_show_size_and_color() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let invoice = InvoicePrintTemplate::new(&order(), Language::En, &offset);
        assert_eq!(invoice.lines[0].details, "42 / Red");
        assert_eq!(invoice.lines[0].subtotal, "1098.00 TND");
        assert_eq!(invoice.total, "1098.00 TND");
        assert_eq!(invoice.shop_name, "LuxeShopy");
    }

    #[test]
    fn test_print_renders_branding() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let html = InvoicePrintTemplate::new(&order(), Language::En, &offset)
            .render()
            .unwrap();
        assert!(html.contains("Premium Luxury Footwear"));
        assert!(html.contains(INVOICE_FOOTER));
        assert!(html.contains("Nike Air Max (Red)"));
    }
}
