//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::realtime::NotificationCenter;
use crate::storage::{StorageClient, StorageError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    storage: Option<StorageClient>,
    notifications: NotificationCenter,
}

impl AppState {
    /// Build the state, creating the storage client when uploads are configured.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StorageError> {
        let storage = config.storage().map(StorageClient::new).transpose()?;
        if storage.is_none() {
            tracing::warn!("BAAS_URL/BAAS_SERVICE_KEY not set; image uploads are disabled");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storage,
                notifications: NotificationCenter::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Object storage client, if uploads are enabled.
    #[must_use]
    pub fn storage(&self) -> Option<&StorageClient> {
        self.inner.storage.as_ref()
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        &self.inner.notifications
    }

    /// Current time in the shop's timezone.
    #[must_use]
    pub fn shop_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.inner.config.shop_offset)
    }
}
