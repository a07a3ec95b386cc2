//! Cached catalog reads.
//!
//! Products are cached with `moka` for 5 minutes. A background task listens on
//! the `products_changed` Postgres channel (fed by a statement trigger on
//! `products`) and drops the cache whenever the admin edits the catalog, so
//! the TTL only matters if the listener is down.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use sqlx::postgres::PgListener;

use luxeshopy_core::{Product, ProductId, product::example_products};

use crate::db::{ProductRepository, RepositoryError};

/// Postgres channel carrying catalog changes.
pub const PRODUCTS_CHANNEL: &str = "products_changed";

const CACHE_TTL: Duration = Duration::from_secs(300);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Cache key for catalog entries.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
}

/// Catalog reads with a shared cache.
#[derive(Clone)]
pub struct Catalog {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl Catalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();
        Self { pool, cache }
    }

    /// Every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the products cannot be loaded.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await {
            return Ok(products);
        }

        let products = Arc::new(ProductRepository::new(&self.pool).list_all().await?);
        self.cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// A single product. Served from the cached list when it is warm.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product cannot be loaded.
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await {
            return Ok(products.iter().find(|p| p.id == id).cloned());
        }
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            return Ok(Some(*product));
        }

        let product = ProductRepository::new(&self.pool).get_by_id(id).await?;
        if let Some(product) = &product {
            self.cache
                .insert(key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }
        Ok(product)
    }

    /// Products for the home page, seeding the example catalog into an empty
    /// store first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if seeding or loading fails.
    pub async fn products_seeding_if_empty(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        let products = self.products().await?;
        if !products.is_empty() {
            return Ok(products);
        }

        let inserted = ProductRepository::new(&self.pool)
            .seed_if_empty(&example_products())
            .await?;
        if inserted == 0 {
            return Ok(products);
        }
        tracing::info!(inserted, "Seeded example catalog");
        self.invalidate_all().await;
        self.products().await
    }

    /// Drop every cached entry.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Spawn the invalidation listener. It reconnects after a fixed delay.
    #[must_use]
    pub fn spawn_invalidation_listener(&self) -> tokio::task::JoinHandle<()> {
        let catalog = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = catalog.listen().await {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = RECONNECT_DELAY.as_secs(),
                        "Catalog change listener stopped"
                    );
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        })
    }

    async fn listen(&self) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(PRODUCTS_CHANNEL).await?;
        tracing::info!(channel = PRODUCTS_CHANNEL, "Listening for catalog changes");

        // Changes made while disconnected were missed.
        self.invalidate_all().await;

        loop {
            let notification = listener.recv().await?;
            tracing::debug!(op = notification.payload(), "Catalog changed, dropping cache");
            self.invalidate_all().await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use luxeshopy_core::{ImageSource, Price};

    fn product(title: &str) -> Product {
        Product {
            id: ProductId::random(),
            title: title.to_string(),
            price: Price::from_dinars(549),
            description: String::new(),
            image_url: None,
            sizes: vec![41, 42],
            color: None,
            category: None,
            cost_price: Price::ZERO,
            compare_at_price: Price::ZERO,
            image_source: ImageSource::Url,
            created_at: Utc::now(),
        }
    }

    fn catalog() -> Catalog {
        // Never connects: every read below is served from the cache.
        Catalog::new(PgPool::connect_lazy("postgres://localhost/unused").unwrap())
    }

    #[tokio::test]
    async fn test_warm_list_serves_single_products() {
        let catalog = catalog();
        let wanted = product("Silk Pump");
        let products = Arc::new(vec![product("Air Runner"), wanted.clone()]);
        catalog
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products))
            .await;

        assert_eq!(catalog.products().await.unwrap().len(), 2);
        assert_eq!(catalog.product(wanted.id).await.unwrap(), Some(wanted));
        assert_eq!(catalog.product(ProductId::random()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_single_product_entry() {
        let catalog = catalog();
        let wanted = product("Velvet Loafer");
        catalog
            .cache
            .insert(
                CacheKey::Product(wanted.id),
                CacheValue::Product(Box::new(wanted.clone())),
            )
            .await;
        assert_eq!(catalog.product(wanted.id).await.unwrap(), Some(wanted));
    }

    #[tokio::test]
    async fn test_invalidate_all_empties_cache() {
        let catalog = catalog();
        catalog
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::new(Vec::new())))
            .await;
        catalog.invalidate_all().await;
        assert!(catalog.cache.get(&CacheKey::Products).await.is_none());
    }
}
