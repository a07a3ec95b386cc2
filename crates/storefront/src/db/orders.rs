//! Order repository: checkout inserts and the confirmation lookup.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::JsonValue;
use uuid::Uuid;

use luxeshopy_core::{NewOrder, OrderId, OrderStatus, PaymentStatus, Price};

use super::RepositoryError;

/// What the confirmation page shows about a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub id: OrderId,
    pub customer_name: String,
    pub total_price: Price,
    pub item_count: u32,
    pub created_at: DateTime<Utc>,
}

impl OrderConfirmation {
    /// First 8 characters of the id, uppercased.
    #[must_use]
    pub fn invoice_number(&self) -> String {
        self.id.to_string().chars().take(8).collect::<String>().to_uppercase()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConfirmationRow {
    id: Uuid,
    customer_name: Option<String>,
    total_price: Option<Decimal>,
    item_count: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<ConfirmationRow> for OrderConfirmation {
    fn from(row: ConfirmationRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            customer_name: row.customer_name.unwrap_or_default(),
            total_price: Price::new(row.total_price.unwrap_or_default()),
            item_count: row
                .item_count
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// Repository for storefront order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a validated order as pending and unpaid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the items cannot be encoded.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let items: JsonValue = serde_json::to_value(&order.items)
            .map_err(|e| RepositoryError::DataCorruption(format!("order items: {e}")))?;

        let id: Uuid = sqlx::query_scalar(
            r"
            INSERT INTO orders
                (customer_name, phone, address, total_price, items, status, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&order.customer_name)
        .bind(&order.phone)
        .bind(&order.address)
        .bind(order.total_price.amount())
        .bind(items)
        .bind(OrderStatus::Pending.as_str())
        .bind(PaymentStatus::Unpaid.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(OrderId::new(id))
    }

    /// Summary of an order for the confirmation page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn confirmation(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderConfirmation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConfirmationRow>(
            r"
            SELECT
                id,
                customer_name,
                total_price,
                (SELECT COALESCE(SUM((item->>'quantity')::bigint), 0)
                   FROM jsonb_array_elements(
                       CASE WHEN jsonb_typeof(items) = 'array' THEN items ELSE '[]'::jsonb END
                   ) AS item)::bigint AS item_count,
                created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(OrderConfirmation::from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_from_row() {
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        let confirmation = OrderConfirmation::from(ConfirmationRow {
            id,
            customer_name: None,
            total_price: Some(Decimal::new(109_800, 2)),
            item_count: Some(2),
            created_at: Utc::now(),
        });
        assert_eq!(confirmation.customer_name, "");
        assert_eq!(confirmation.item_count, 2);
        assert_eq!(confirmation.total_price.to_string(), "1098.00 TND");
        assert_eq!(confirmation.invoice_number(), "A1B2C3D4");
    }

    #[test]
    fn test_negative_item_count_reads_as_zero() {
        let confirmation = OrderConfirmation::from(ConfirmationRow {
            id: Uuid::new_v4(),
            customer_name: Some("Amira".to_string()),
            total_price: None,
            item_count: Some(-1),
            created_at: Utc::now(),
        });
        assert_eq!(confirmation.item_count, 0);
        assert_eq!(confirmation.total_price, Price::ZERO);
    }
}
