//! Seed the catalog with the example products.

use luxeshopy_admin::db::ProductRepository;
use luxeshopy_core::product::example_products;

use super::connect;

/// Insert the example catalog when the products table is empty.
///
/// Returns the number of products inserted (zero when the catalog already has
/// products).
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn products() -> Result<usize, Box<dyn std::error::Error>> {
    let pool = connect().await?;

    let examples = example_products();
    let inserted = ProductRepository::new(&pool)
        .seed_if_empty(&examples)
        .await?;

    if inserted == 0 {
        tracing::info!("Products table is not empty; nothing seeded");
    } else {
        tracing::info!(inserted, "Seeded example products");
    }
    Ok(inserted)
}
