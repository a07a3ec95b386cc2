//! Product repository (read side of the catalog).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use luxeshopy_core::{Category, ImageSource, Price, Product, ProductId, ProductInput};

use super::RepositoryError;

const PRODUCT_COLUMNS: &str = "id, title, price, description, image_url, sizes, color, category, \
     cost_price, compare_at_price, image_type, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    title: Option<String>,
    price: Option<Decimal>,
    description: Option<String>,
    image_url: Option<String>,
    sizes: Option<Vec<i32>>,
    color: Option<String>,
    category: Option<String>,
    cost_price: Option<Decimal>,
    compare_at_price: Option<Decimal>,
    image_type: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            title: row.title.unwrap_or_default(),
            price: Price::new(row.price.unwrap_or_default()),
            description: row.description.unwrap_or_default(),
            image_url: row.image_url.filter(|u| !u.trim().is_empty()),
            sizes: row.sizes.unwrap_or_default(),
            color: row.color.filter(|c| !c.trim().is_empty()),
            category: Category::from_stored(row.category.as_deref()),
            cost_price: Price::new(row.cost_price.unwrap_or_default()),
            compare_at_price: Price::new(row.compare_at_price.unwrap_or_default()),
            image_source: ImageSource::from_stored(row.image_type.as_deref()),
            created_at: row.created_at,
        }
    }
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Insert the example catalog when the table is empty.
    ///
    /// Returns the number of products inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn seed_if_empty(&self, products: &[ProductInput]) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        if count > 0 {
            return Ok(0);
        }

        for input in products {
            sqlx::query(
                r"
                INSERT INTO products
                    (title, price, description, image_url, sizes, color, category,
                     cost_price, compare_at_price, image_type)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ",
            )
            .bind(&input.title)
            .bind(input.price.amount())
            .bind(&input.description)
            .bind(input.image_url.as_deref())
            .bind(&input.sizes)
            .bind(input.color.as_deref())
            .bind(input.category.as_str())
            .bind(input.cost_price.amount())
            .bind(input.compare_at_price.amount())
            .bind(input.image_source.as_str())
            .execute(self.pool)
            .await?;
        }
        Ok(products.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_coercion() {
        let product = Product::from(ProductRow {
            id: Uuid::new_v4(),
            title: None,
            price: None,
            description: None,
            image_url: Some("  ".to_string()),
            sizes: None,
            color: Some("Gold".to_string()),
            category: Some("MEN".to_string()),
            cost_price: None,
            compare_at_price: None,
            image_type: Some("upload".to_string()),
            created_at: Utc::now(),
        });
        assert_eq!(product.title, "");
        assert_eq!(product.price, Price::ZERO);
        assert!(product.sizes.is_empty());
        assert_eq!(product.image_url, None);
        assert_eq!(product.color.as_deref(), Some("Gold"));
        assert_eq!(product.category, Some(Category::Men));
        assert_eq!(product.image_source, ImageSource::Upload);
    }
}
