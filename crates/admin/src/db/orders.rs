//! Order repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::JsonValue;
use uuid::Uuid;

use luxeshopy_core::{Order, OrderId, OrderItem, OrderStatus, PaymentStatus, Price};

use super::RepositoryError;

const ORDER_COLUMNS: &str =
    "id, customer_name, phone, address, total_price, items, status, payment_status, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    id: Uuid,
    customer_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    total_price: Option<Decimal>,
    items: Option<JsonValue>,
    status: Option<String>,
    payment_status: Option<String>,
    created_at: DateTime<Utc>,
}

/// Read the stored items. Unreadable items leave the order with no lines;
/// its total, status and customer still count everywhere else.
fn read_items(order_id: Uuid, items: Option<JsonValue>) -> Vec<OrderItem> {
    match items {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(order_id = %order_id, error = %e, "Unreadable order items");
            Vec::new()
        }),
    }
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            items: read_items(row.id, row.items),
            customer_name: row.customer_name.unwrap_or_default(),
            phone: row.phone.filter(|p| !p.trim().is_empty()),
            address: row.address.filter(|a| !a.trim().is_empty()),
            total_price: Price::new(row.total_price.unwrap_or_default()),
            status: OrderStatus::from_stored(row.status.as_deref()),
            payment_status: PaymentStatus::from_stored(row.payment_status.as_deref()),
            created_at: row.created_at,
        }
    }
}

fn collect_orders(rows: Vec<OrderRow>) -> Vec<Order> {
    rows.into_iter().map(Order::from).collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(collect_orders(rows))
    }

    /// The most recent `limit` orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(collect_orders(rows))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Count orders whose status is pending (a missing status counts as pending).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_pending(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE status IS NULL OR lower(status) = 'pending'",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Set the fulfilment status of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set the payment status of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_payment_status(
        &self,
        id: OrderId,
        payment: PaymentStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET payment_status = $2 WHERE id = $1")
            .bind(id)
            .bind(payment.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(items: Option<JsonValue>) -> OrderRow {
        OrderRow {
            id: Uuid::new_v4(),
            customer_name: None,
            phone: Some(String::new()),
            address: None,
            total_price: None,
            items,
            status: None,
            payment_status: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_statuses_default_to_pending_and_paid() {
        let order = Order::from(row(None));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.customer_name, "");
        assert_eq!(order.phone, None);
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_items_accept_legacy_field_names() {
        let items = serde_json::json!([{
            "productId": Uuid::new_v4(),
            "name": "Nike Air Max",
            "price": "549",
            "quantity": 2,
            "size": 42,
            "color": "Red",
            "image_url": "https://cdn.example.com/a.jpg"
        }]);
        let order = Order::from(row(Some(items)));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].title, "Nike Air Max");
        assert_eq!(order.items[0].quantity, 2);
    }

    #[test]
    fn test_unreadable_items_keep_the_order() {
        let mut broken = row(Some(serde_json::json!({"oops": true})));
        broken.total_price = Some(Decimal::new(549, 0));
        let orders = collect_orders(vec![broken, row(Some(serde_json::json!(7)))]);
        assert_eq!(orders.len(), 2);
        assert!(orders[0].items.is_empty());
        assert_eq!(orders[0].total_price, Price::from_dinars(549));
    }

    #[test]
    fn test_items_written_as_cart_lines() {
        let id = Uuid::new_v4();
        let items = serde_json::json!([{
            "id": id,
            "lineId": format!("{id}::41::"),
            "name": "Adidas UltraBOOST",
            "price": 599,
            "quantity": 2.0,
            "size": 41
        }]);
        let order = Order::from(row(Some(items)));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].size, Some(41));
    }
}
