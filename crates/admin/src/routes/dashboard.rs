//! Dashboard and insights pages.

use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use chrono::FixedOffset;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tower_sessions::Session;
use tracing::instrument;

use luxeshopy_core::stats::{
    self, ChartPoint, DashboardStats, Insights, PeriodStat, StatusCount,
};
use luxeshopy_core::Order;

use crate::db::{OrderRepository, ProductRepository};
use crate::filters;
use crate::i18n::Strings;
use crate::middleware::RequireAdmin;
use crate::routes::{Page, format_date, render};
use crate::state::AppState;

/// Orders shown in the dashboard's recent list.
const RECENT_ORDER_COUNT: usize = 5;

/// One bar of a revenue chart.
#[derive(Debug, Clone)]
pub struct ChartBarView {
    pub label: String,
    pub revenue: String,
    /// Bar height as a percentage of the tallest bar.
    pub height_pct: u32,
}

/// Build chart bars scaled to the largest value.
fn chart_bars(points: &[ChartPoint]) -> Vec<ChartBarView> {
    let max = points
        .iter()
        .map(|p| p.revenue.amount())
        .max()
        .unwrap_or(Decimal::ZERO);

    points
        .iter()
        .map(|p| {
            let height_pct = if max > Decimal::ZERO {
                (p.revenue.amount() * Decimal::ONE_HUNDRED / max)
                    .round()
                    .to_u32()
                    .unwrap_or(0)
            } else {
                0
            };
            ChartBarView {
                label: p.label.clone(),
                revenue: p.revenue.to_string(),
                height_pct,
            }
        })
        .collect()
}

/// A row of the period breakdown table.
#[derive(Debug, Clone)]
pub struct PeriodView {
    pub label: &'static str,
    pub orders: usize,
    pub earnings: String,
}

impl From<&PeriodStat> for PeriodView {
    fn from(stat: &PeriodStat) -> Self {
        Self {
            label: stat.period.label(),
            orders: stat.orders,
            earnings: stat.earnings.to_string(),
        }
    }
}

/// Recent order row.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub id: String,
    pub invoice_number: String,
    pub customer_name: String,
    pub total: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub date: String,
}

impl RecentOrderView {
    fn new(order: &Order, t: &Strings, offset: &FixedOffset) -> Self {
        Self {
            id: order.id.to_string(),
            invoice_number: order.invoice_number(),
            customer_name: order.display_name().to_string(),
            total: order.total_price.to_string(),
            status: t.order_status(order.status),
            status_class: order.status.as_str(),
            date: format_date(order.created_at, offset),
        }
    }
}

/// Dashboard metrics.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub revenue: String,
    pub profit: String,
    pub orders: String,
    pub pending: String,
    pub products: String,
}

impl From<&DashboardStats> for DashboardMetrics {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            revenue: stats.total_revenue.to_string(),
            profit: stats.total_profit.to_string(),
            orders: stats.total_orders.to_string(),
            pending: stats.pending_orders.to_string(),
            products: stats.total_products.to_string(),
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: Page,
    pub metrics: DashboardMetrics,
    pub chart: Vec<ChartBarView>,
    pub periods: Vec<PeriodView>,
    pub recent_orders: Vec<RecentOrderView>,
}

/// Status distribution slice.
#[derive(Debug, Clone)]
pub struct StatusSliceView {
    pub label: &'static str,
    pub class: &'static str,
    pub count: usize,
    pub pct: u32,
}

fn status_slices(counts: &[StatusCount], t: &Strings) -> Vec<StatusSliceView> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| StatusSliceView {
            label: t.order_status(c.status),
            class: c.status.as_str(),
            count: c.count,
            pct: if total == 0 {
                0
            } else {
                u32::try_from(c.count * 100 / total).unwrap_or(100)
            },
        })
        .collect()
}

/// Insights template.
#[derive(Template)]
#[template(path = "insights.html")]
pub struct InsightsTemplate {
    pub page: Page,
    pub total_revenue: String,
    pub estimated_profit: String,
    pub profit_margin: u32,
    pub order_count: usize,
    pub chart: Vec<ChartBarView>,
    pub statuses: Vec<StatusSliceView>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/insights", get(insights))
}

/// Load all orders, degrading to an empty list with an error message.
async fn load_orders(state: &AppState) -> (Vec<Order>, Option<String>) {
    match OrderRepository::new(state.pool()).list_all().await {
        Ok(orders) => (orders, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch orders");
            (Vec::new(), Some("Failed to load orders".to_string()))
        }
    }
}

/// Dashboard page handler.
#[instrument(skip(admin, state, session))]
pub async fn dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Html<String> {
    let mut page = Page::load(&session, admin, "/admin/dashboard").await;

    let products = ProductRepository::new(state.pool());
    let ((orders, orders_error), product_count) =
        tokio::join!(load_orders(&state), products.count());
    if let Some(message) = orders_error {
        page = page.with_error(message);
    }
    let product_count = product_count.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to count products");
        0
    });

    let offset = state.config().shop_offset;
    let now = state.shop_now();
    let summary = DashboardStats::compute(&orders, product_count);

    let template = DashboardTemplate {
        metrics: DashboardMetrics::from(&summary),
        chart: chart_bars(&stats::sales_chart(&orders, &offset)),
        periods: stats::period_breakdown(&orders, &now)
            .iter()
            .map(PeriodView::from)
            .collect(),
        recent_orders: orders
            .iter()
            .take(RECENT_ORDER_COUNT)
            .map(|o| RecentOrderView::new(o, page.t, &offset))
            .collect(),
        page,
    };

    render(&template)
}

/// Insights page handler.
#[instrument(skip(admin, state, session))]
pub async fn insights(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Html<String> {
    let mut page = Page::load(&session, admin, "/admin/insights").await;
    let (orders, orders_error) = load_orders(&state).await;
    if let Some(message) = orders_error {
        page = page.with_error(message);
    }

    let insights = Insights::compute(&orders, &state.shop_now());

    let template = InsightsTemplate {
        total_revenue: insights.total_revenue.to_string(),
        estimated_profit: insights.estimated_profit.to_string(),
        profit_margin: insights.profit_margin,
        order_count: insights.order_count,
        chart: chart_bars(&insights.chart),
        statuses: status_slices(&insights.status_distribution, page.t),
        page,
    };

    render(&template)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use luxeshopy_core::{OrderStatus, Price};

    fn point(day: u32, dinars: i64) -> ChartPoint {
        ChartPoint {
            date: NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
            label: format!("Oct {day}"),
            revenue: Price::from_dinars(dinars),
        }
    }

    #[test]
    fn test_chart_bars_scale_to_tallest() {
        let bars = chart_bars(&[point(1, 50), point(2, 200), point(3, 0)]);
        assert_eq!(bars[0].height_pct, 25);
        assert_eq!(bars[1].height_pct, 100);
        assert_eq!(bars[2].height_pct, 0);
        assert_eq!(bars[1].revenue, "200.00 TND");
    }

    #[test]
    fn test_chart_bars_all_zero() {
        let bars = chart_bars(&[point(1, 0), point(2, 0)]);
        assert!(bars.iter().all(|b| b.height_pct == 0));
    }

    #[test]
    fn test_status_slices_percentages() {
        let counts = [
            StatusCount { status: OrderStatus::Pending, count: 1 },
            StatusCount { status: OrderStatus::Delivered, count: 3 },
        ];
        let slices = status_slices(&counts, crate::i18n::Language::En.strings());
        assert_eq!(slices[0].pct, 25);
        assert_eq!(slices[1].pct, 75);
        assert_eq!(slices[1].label, "Delivered");
    }
}
