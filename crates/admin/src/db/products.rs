//! Product repository.
//!
//! Rows are coerced on the way out: a missing title reads as an empty string,
//! missing amounts as zero, missing sizes as an empty list.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use luxeshopy_core::{Category, ImageSource, Price, Product, ProductId, ProductInput, ProductPatch};

use super::RepositoryError;

const PRODUCT_COLUMNS: &str = "id, title, price, description, image_url, sizes, color, category, \
     cost_price, compare_at_price, image_type, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
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

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
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

    /// Count products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products
                (title, price, description, image_url, sizes, color, category,
                 cost_price, compare_at_price, image_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
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
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update. Fields left as `None` keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products SET
                title = COALESCE($2, title),
                price = COALESCE($3, price),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url),
                sizes = COALESCE($6, sizes),
                color = COALESCE($7, color),
                category = COALESCE($8, category),
                cost_price = COALESCE($9, cost_price),
                compare_at_price = COALESCE($10, compare_at_price),
                image_type = COALESCE($11, image_type)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.price.map(|p| p.amount()))
        .bind(patch.description.as_deref())
        .bind(patch.image_url.as_deref())
        .bind(patch.sizes.as_ref())
        .bind(patch.color.as_deref())
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.cost_price.map(|p| p.amount()))
        .bind(patch.compare_at_price.map(|p| p.amount()))
        .bind(patch.image_source.map(|s| s.as_str()))
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert the example catalog when the table is empty.
    ///
    /// Returns the number of products inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn seed_if_empty(&self, products: &[ProductInput]) -> Result<usize, RepositoryError> {
        if self.count().await? > 0 {
            return Ok(0);
        }
        for product in products {
            self.create(product).await?;
        }
        Ok(products.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row() -> ProductRow {
        ProductRow {
            id: Uuid::new_v4(),
            title: None,
            price: None,
            description: None,
            image_url: Some(String::new()),
            sizes: None,
            color: None,
            category: Some("Women".to_string()),
            cost_price: None,
            compare_at_price: None,
            image_type: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_columns_are_coerced() {
        let product = Product::from(row());
        assert_eq!(product.title, "");
        assert_eq!(product.price, Price::ZERO);
        assert!(product.sizes.is_empty());
        assert_eq!(product.image_url, None);
        assert_eq!(product.image_source, ImageSource::Url);
        assert_eq!(product.category, Some(Category::Women));
    }

    #[test]
    fn test_unknown_category_reads_as_men() {
        let mut r = row();
        r.category = Some("kids".to_string());
        assert_eq!(Product::from(r).category, Some(Category::Men));
    }
}
