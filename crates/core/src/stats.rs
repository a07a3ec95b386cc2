//! Derived dashboard statistics.
//!
//! Everything here is computed from an in-memory list of orders. The one
//! revenue rule, [`counts_toward_revenue`], is shared by every figure so the
//! dashboard cards, charts and period breakdown always agree.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::order::Order;
use crate::types::{OrderStatus, Price};

/// Margin assumed when estimating profit, since cost prices are not tracked
/// for every product.
pub const FALLBACK_MARGIN: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

/// Number of days shown on revenue charts.
pub const CHART_DAYS: usize = 7;

/// Whether an order's total counts toward revenue.
///
/// Paid orders always count. Unpaid orders still count unless they were
/// cancelled. Orders with no recorded payment status read as paid.
#[must_use]
pub fn counts_toward_revenue(order: &Order) -> bool {
    order.is_paid() || !order.is_cancelled()
}

/// Sum of revenue-counting order totals, rounded to two decimals.
#[must_use]
pub fn revenue<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Price {
    orders
        .into_iter()
        .filter(|o| counts_toward_revenue(o))
        .map(|o| o.total_price)
        .sum::<Price>()
        .rounded()
}

/// Profit estimate at [`FALLBACK_MARGIN`].
#[must_use]
pub fn estimated_profit(revenue: Price) -> Price {
    (revenue * FALLBACK_MARGIN).rounded()
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_revenue: Price,
    pub total_profit: Price,
    pub total_orders: usize,
    pub pending_orders: usize,
    pub total_products: i64,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(orders: &[Order], total_products: i64) -> Self {
        let total_revenue = revenue(orders);
        Self {
            total_revenue,
            total_profit: estimated_profit(total_revenue),
            total_orders: orders.len(),
            pending_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
            total_products,
        }
    }
}

/// One day on a revenue chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    /// Short label such as `Oct 18`.
    pub label: String,
    pub revenue: Price,
}

impl ChartPoint {
    fn new(date: NaiveDate, revenue: Price) -> Self {
        Self {
            date,
            label: date.format("%b %-d").to_string(),
            revenue: revenue.rounded(),
        }
    }
}

fn local_date<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Revenue per calendar day for the most recent days that had sales.
///
/// Days are taken in `tz`, sorted oldest first, and only the last
/// [`CHART_DAYS`] buckets are kept. Days without revenue are not shown.
#[must_use]
pub fn sales_chart<Tz: TimeZone>(orders: &[Order], tz: &Tz) -> Vec<ChartPoint> {
    let mut buckets: Vec<(NaiveDate, Price)> = Vec::new();
    for order in orders.iter().filter(|o| counts_toward_revenue(o)) {
        let day = local_date(order.created_at, tz);
        match buckets.iter_mut().find(|(d, _)| *d == day) {
            Some((_, total)) => *total = *total + order.total_price,
            None => buckets.push((day, order.total_price)),
        }
    }
    buckets.sort_by_key(|(d, _)| *d);
    let skip = buckets.len().saturating_sub(CHART_DAYS);
    buckets
        .into_iter()
        .skip(skip)
        .map(|(d, total)| ChartPoint::new(d, total))
        .collect()
}

/// Revenue for each of the last [`CHART_DAYS`] days ending today, zero-filled.
#[must_use]
pub fn last_seven_days<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> Vec<ChartPoint> {
    let tz = now.timezone();
    let today = now.date_naive();
    (0..CHART_DAYS)
        .rev()
        .filter_map(|back| {
            let offset = i64::try_from(back).ok()?;
            today.checked_sub_signed(Duration::days(offset))
        })
        .map(|day| {
            let total = revenue(
                orders
                    .iter()
                    .filter(|o| local_date(o.created_at, &tz) == day),
            );
            ChartPoint::new(day, total)
        })
        .collect()
}

/// Count of orders in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// The insights page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insights {
    pub total_revenue: Price,
    pub estimated_profit: Price,
    /// Percentage shown next to the profit card: the fallback margin when
    /// there is any revenue, otherwise zero.
    pub profit_margin: u32,
    /// Orders that were not cancelled.
    pub order_count: usize,
    pub chart: Vec<ChartPoint>,
    pub status_distribution: Vec<StatusCount>,
}

impl Insights {
    #[must_use]
    pub fn compute<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> Self {
        let total_revenue = revenue(orders);
        let profit_margin = if total_revenue > Price::ZERO { 30 } else { 0 };
        Self {
            total_revenue,
            estimated_profit: estimated_profit(total_revenue),
            profit_margin,
            order_count: orders.iter().filter(|o| !o.is_cancelled()).count(),
            chart: last_seven_days(orders, now),
            status_distribution: OrderStatus::SELECTABLE
                .into_iter()
                .map(|status| StatusCount {
                    status,
                    count: orders.iter().filter(|o| o.status == status).count(),
                })
                .collect(),
        }
    }
}

/// Reporting windows for the detailed breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Period {
    Today,
    Yesterday,
    LastWeek,
    LastMonth,
    LastYear,
    AllTime,
}

impl Period {
    pub const ALL: [Self; 6] = [
        Self::Today,
        Self::Yesterday,
        Self::LastWeek,
        Self::LastMonth,
        Self::LastYear,
        Self::AllTime,
    ];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::LastWeek => "This week",
            Self::LastMonth => "This month",
            Self::LastYear => "This year",
            Self::AllTime => "All time",
        }
    }

    fn contains<Tz: TimeZone>(self, at: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        let rolling = |days: i64| at >= now.with_timezone(&Utc) - Duration::days(days);
        let day = local_date(at, &now.timezone());
        let today = now.date_naive();
        match self {
            Self::Today => day == today,
            Self::Yesterday => today.pred_opt() == Some(day),
            Self::LastWeek => rolling(7),
            Self::LastMonth => rolling(30),
            Self::LastYear => rolling(365),
            Self::AllTime => true,
        }
    }
}

/// Orders and earnings within one [`Period`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodStat {
    pub period: Period,
    pub orders: usize,
    pub earnings: Price,
}

/// Order counts and earnings for today, yesterday, the last 7/30/365 days
/// and all time. Counts include every order; earnings follow the revenue rule.
#[must_use]
pub fn period_breakdown<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> Vec<PeriodStat> {
    Period::ALL
        .into_iter()
        .map(|period| {
            let in_period: Vec<&Order> = orders
                .iter()
                .filter(|o| period.contains(o.created_at, now))
                .collect();
            PeriodStat {
                period,
                orders: in_period.len(),
                earnings: revenue(in_period),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::FixedOffset;

    use super::*;
    use crate::order::tests::order;
    use crate::types::PaymentStatus;

    fn orders() -> Vec<Order> {
        vec![
            order("A", Some("1"), 100, OrderStatus::Delivered, PaymentStatus::Paid, 0),
            order("B", Some("2"), 200, OrderStatus::Pending, PaymentStatus::Unpaid, 1),
            order("C", Some("3"), 400, OrderStatus::Cancelled, PaymentStatus::Unpaid, 2),
            order("D", Some("4"), 800, OrderStatus::Cancelled, PaymentStatus::Paid, 40),
        ]
    }

    #[test]
    fn test_revenue_rule() {
        let o = orders();
        assert!(counts_toward_revenue(&o[0]));
        assert!(counts_toward_revenue(&o[1]));
        assert!(!counts_toward_revenue(&o[2]));
        assert!(counts_toward_revenue(&o[3]));
        assert_eq!(revenue(&o), Price::from_dinars(1100));
    }

    #[test]
    fn test_dashboard_stats() {
        let stats = DashboardStats::compute(&orders(), 12);
        assert_eq!(stats.total_revenue, Price::from_dinars(1100));
        assert_eq!(stats.total_profit, Price::from_dinars(330));
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.total_products, 12);
    }

    #[test]
    fn test_sales_chart_buckets_by_day_oldest_first() {
        let chart = sales_chart(&orders(), &Utc);
        assert_eq!(chart.len(), 3);
        assert!(chart.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(chart.last().unwrap().revenue, Price::from_dinars(100));
    }

    #[test]
    fn test_sales_chart_keeps_last_seven_buckets() {
        let many: Vec<Order> = (0..10)
            .map(|d| order("X", None, 10, OrderStatus::Pending, PaymentStatus::Paid, d))
            .collect();
        let chart = sales_chart(&many, &Utc);
        assert_eq!(chart.len(), CHART_DAYS);
        assert_eq!(chart.last().unwrap().date, Utc::now().date_naive());
    }

    #[test]
    fn test_last_seven_days_zero_filled() {
        let now = Utc::now();
        let chart = last_seven_days(&orders(), &now);
        assert_eq!(chart.len(), 7);
        assert_eq!(chart.last().unwrap().date, now.date_naive());
        assert_eq!(chart.last().unwrap().revenue, Price::from_dinars(100));
        let total: Price = chart.iter().map(|p| p.revenue).sum();
        assert_eq!(total, Price::from_dinars(300));
    }

    #[test]
    fn test_insights() {
        let insights = Insights::compute(&orders(), &Utc::now());
        assert_eq!(insights.order_count, 2);
        assert_eq!(insights.profit_margin, 30);
        let cancelled = insights
            .status_distribution
            .iter()
            .find(|s| s.status == OrderStatus::Cancelled)
            .unwrap();
        assert_eq!(cancelled.count, 2);

        let empty = Insights::compute(&[], &Utc::now());
        assert_eq!(empty.profit_margin, 0);
        assert_eq!(empty.chart.len(), 7);
    }

    #[test]
    fn test_period_breakdown() {
        let tunis = FixedOffset::east_opt(3600).unwrap();
        let now = Utc::now().with_timezone(&tunis);
        let breakdown = period_breakdown(&orders(), &now);
        let get = |p: Period| breakdown.iter().find(|s| s.period == p).unwrap().clone();

        assert_eq!(get(Period::LastWeek).orders, 3);
        assert_eq!(get(Period::LastWeek).earnings, Price::from_dinars(300));
        assert_eq!(get(Period::LastMonth).orders, 3);
        assert_eq!(get(Period::AllTime).orders, 4);
        assert_eq!(get(Period::AllTime).earnings, Price::from_dinars(1100));
    }

    #[test]
    fn test_chart_label_format() {
        let point = ChartPoint::new(NaiveDate::from_ymd_opt(2025, 10, 8).unwrap(), Price::ZERO);
        assert_eq!(point.label, "Oct 8");
    }
}
