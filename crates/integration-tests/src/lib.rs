//! Integration tests for LuxeShopy.
//!
//! The tests talk to running binaries over HTTP and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p luxeshopy-cli -- migrate run
//! cargo run -p luxeshopy-cli -- admin create -u admin -p 'integration-pass'
//! cargo run -p luxeshopy-storefront &
//! cargo run -p luxeshopy-admin &
//!
//! cargo test -p luxeshopy-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_URL` - default `http://localhost:3000`
//! - `ADMIN_URL` - default `http://localhost:3001`
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD` - credentials for the admin tests

use reqwest::Client;

/// Base URL of the running storefront.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the running admin panel.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client that keeps cookies, so the session cart or admin token survives
/// between requests.
///
/// # Errors
///
/// Returns the reqwest error if the client cannot be built.
pub fn client() -> reqwest::Result<Client> {
    Client::builder().cookie_store(true).build()
}

/// A cookie-keeping client that does not follow redirects.
///
/// # Errors
///
/// Returns the reqwest error if the client cannot be built.
pub fn client_without_redirects() -> reqwest::Result<Client> {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Admin credentials from the environment.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    (
        std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "integration-pass".to_string()),
    )
}

/// Log in to the admin panel with `client`.
///
/// # Errors
///
/// Returns the reqwest error if the request fails.
pub async fn admin_login(client: &Client) -> reqwest::Result<reqwest::Response> {
    let (username, password) = admin_credentials();
    client
        .post(format!("{}/admin/login", admin_url()))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
}

/// Pull the first `/products/{id}` link out of a page.
#[must_use]
pub fn first_product_id(html: &str) -> Option<String> {
    let start = html.find("/products/")? + "/products/".len();
    let rest = html.get(start..)?;
    let end = rest.find(|c: char| !(c.is_ascii_hexdigit() || c == '-'))?;
    rest.get(..end).map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_product_id() {
        let html = r#"<a href="/products/3f2a9c1e-0000-4000-8000-000000000000">Shoe</a>"#;
        assert_eq!(
            first_product_id(html).as_deref(),
            Some("3f2a9c1e-0000-4000-8000-000000000000")
        );
        assert_eq!(first_product_id("<p>No products</p>"), None);
    }
}
