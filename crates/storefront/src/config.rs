//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string of the hosted store
//!   (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 0.0.0.0)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `WHATSAPP_NUMBER` - International number (digits only) for the chat button
//! - `WHATSAPP_MESSAGE` - Prefilled chat message
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_WHATSAPP_MESSAGE: &str = "Hello! I am interested in your luxury collection.";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Floating chat button (optional)
    pub whatsapp: Option<WhatsAppConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// WhatsApp chat link settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppConfig {
    /// Number in international format without `+` or spaces
    pub number: String,
    /// Message prefilled in the chat
    pub message: String,
}

impl WhatsAppConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(raw) = get_optional_env("WHATSAPP_NUMBER") else {
            return Ok(None);
        };
        let number = normalize_phone_number(&raw).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "WHATSAPP_NUMBER".to_string(),
                "expected an international number such as +216 22 123 456".to_string(),
            )
        })?;
        Ok(Some(Self {
            number,
            message: get_env_or_default("WHATSAPP_MESSAGE", DEFAULT_WHATSAPP_MESSAGE),
        }))
    }

    /// The `wa.me` link with the message URL-encoded.
    #[must_use]
    pub fn link(&self) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.number,
            urlencoding::encode(&self.message)
        )
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let whatsapp = WhatsAppConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            whatsapp,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Chat link for the floating WhatsApp button, when configured.
    #[must_use]
    pub fn whatsapp_link(&self) -> Option<String> {
        self.whatsapp.as_ref().map(WhatsAppConfig::link)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Strip `+`, spaces and dashes. `wa.me` wants 8 to 15 bare digits.
fn normalize_phone_number(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '+' | ' ' | '-' | '(' | ')'))
        .collect();
    let valid = (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    valid.then_some(digits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, unsafe_code)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/luxeshopy"),
            host: "0.0.0.0".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            whatsapp: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure_follows_base_url() {
        let mut c = config();
        assert!(!c.is_secure());
        c.base_url = "https://luxeshopy.tn".to_string();
        assert!(c.is_secure());
    }

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(
            normalize_phone_number("+216 22-123-456").as_deref(),
            Some("21622123456")
        );
        assert_eq!(normalize_phone_number("12345"), None);
        assert_eq!(normalize_phone_number("+216 22 abc 456"), None);
    }

    #[test]
    fn test_whatsapp_link_encodes_message() {
        let mut c = config();
        assert!(c.whatsapp_link().is_none());
        c.whatsapp = Some(WhatsAppConfig {
            number: "21622123456".to_string(),
            message: DEFAULT_WHATSAPP_MESSAGE.to_string(),
        });
        assert_eq!(
            c.whatsapp_link().unwrap(),
            "https://wa.me/21622123456?text=Hello%21%20I%20am%20interested%20in%20your%20luxury%20collection."
        );
    }

    #[test]
    fn test_whatsapp_from_env() {
        // SAFETY: test-only environment mutation, no other test reads these keys.
        unsafe {
            std::env::set_var("WHATSAPP_NUMBER", "+216 22 123 456");
            std::env::remove_var("WHATSAPP_MESSAGE");
        }
        let whatsapp = WhatsAppConfig::from_env().unwrap().unwrap();
        assert_eq!(whatsapp.number, "21622123456");
        assert_eq!(whatsapp.message, DEFAULT_WHATSAPP_MESSAGE);

        // SAFETY: as above.
        unsafe {
            std::env::set_var("WHATSAPP_NUMBER", "not-a-number");
        }
        assert!(matches!(
            WhatsAppConfig::from_env(),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));

        // SAFETY: as above.
        unsafe {
            std::env::remove_var("WHATSAPP_NUMBER");
        }
        assert!(WhatsAppConfig::from_env().unwrap().is_none());
    }
}
