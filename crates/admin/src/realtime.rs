//! Realtime order notifications.
//!
//! A background task listens on the `orders_changed` Postgres channel (fed by
//! a row trigger on `orders`). Every change is folded into the
//! [`NotificationCenter`] and broadcast to connected browsers, which receive
//! it over Server-Sent Events and refresh the page they are on.
//!
//! - `INSERT`: pending +1, unread +1, a "New Order" notification is prepended
//!   (the list keeps the last 10).
//! - `UPDATE` / `DELETE`: the pending count and the latest 5 orders are
//!   refetched and become the notification list.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use luxeshopy_core::{CURRENCY_CODE, Order};

use crate::db::{OrderRepository, RepositoryError};

/// Postgres channel carrying order changes.
pub const ORDERS_CHANNEL: &str = "orders_changed";

/// Notifications kept in the dropdown.
pub const MAX_NOTIFICATIONS: usize = 10;

/// Orders fetched to rebuild the list after an update or delete.
const RECENT_ORDERS: i64 = 5;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const BROADCAST_CAPACITY: usize = 64;

/// Row operation reported by the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// Payload of an `orders_changed` notification.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderChange {
    pub op: ChangeOp,
    pub id: Uuid,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub total_price: Option<String>,
}

impl OrderChange {
    fn customer(&self) -> &str {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Guest")
    }
}

/// A dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub time: DateTime<Utc>,
}

impl From<&Order> for Notification {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_uuid(),
            title: "Order Tracking".to_string(),
            message: format!(
                "Order from {} - {} {CURRENCY_CODE}",
                order.display_name(),
                order.total_price.amount_string()
            ),
            read: true,
            time: order.created_at,
        }
    }
}

/// Current notification state, as served to the top bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationSnapshot {
    pub pending_count: i64,
    /// Notifications not yet marked read.
    pub unread_count: usize,
    /// Badge counter, cleared by "reset".
    pub unread_notification_count: usize,
    pub notifications: Vec<Notification>,
}

/// Event pushed to browsers.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeEvent {
    pub op: ChangeOp,
    /// Toast text for new orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<String>,
    pub snapshot: NotificationSnapshot,
}

/// In-memory notification center shared by all admin sessions.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<NotificationCenterInner>,
}

struct NotificationCenterInner {
    state: RwLock<NotificationSnapshot>,
    events: broadcast::Sender<RealtimeEvent>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            inner: Arc::new(NotificationCenterInner {
                state: RwLock::new(NotificationSnapshot::default()),
                events,
            }),
        }
    }

    /// Subscribe to realtime events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.inner.events.subscribe()
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> NotificationSnapshot {
        self.inner.state.read().await.clone()
    }

    /// Record a newly inserted order.
    pub async fn record_insert(&self, change: &OrderChange, now: DateTime<Utc>) {
        let snapshot = {
            let mut state = self.inner.state.write().await;
            state.pending_count += 1;
            state.unread_notification_count += 1;
            state.notifications.insert(
                0,
                Notification {
                    id: change.id,
                    title: "New Order".to_string(),
                    message: format!("Order received from {}", change.customer()),
                    read: false,
                    time: now,
                },
            );
            state.notifications.truncate(MAX_NOTIFICATIONS);
            recount(&mut state);
            state.clone()
        };

        let toast = format!(
            "New Order: {} {CURRENCY_CODE}",
            change.total_price.as_deref().unwrap_or("0")
        );
        self.publish(ChangeOp::Insert, Some(toast), snapshot);
    }

    /// Replace the pending count and rebuild the list from the latest orders.
    pub async fn refresh(&self, op: ChangeOp, pending_count: i64, recent: &[Order]) {
        let snapshot = {
            let mut state = self.inner.state.write().await;
            state.pending_count = pending_count;
            state.notifications = recent.iter().map(Notification::from).collect();
            recount(&mut state);
            state.clone()
        };
        self.publish(op, None, snapshot);
    }

    /// Mark every notification as read.
    pub async fn mark_all_read(&self) -> NotificationSnapshot {
        let mut state = self.inner.state.write().await;
        for n in &mut state.notifications {
            n.read = true;
        }
        recount(&mut state);
        state.clone()
    }

    /// Clear the badge counter.
    pub async fn reset_count(&self) -> NotificationSnapshot {
        let mut state = self.inner.state.write().await;
        state.unread_notification_count = 0;
        state.clone()
    }

    fn publish(&self, op: ChangeOp, toast: Option<String>, snapshot: NotificationSnapshot) {
        // No receivers is fine: nobody has the admin open.
        let _ = self.inner.events.send(RealtimeEvent { op, toast, snapshot });
    }
}

fn recount(state: &mut NotificationSnapshot) {
    state.unread_count = state.notifications.iter().filter(|n| !n.read).count();
}

/// Load the pending count and latest orders into the center.
///
/// # Errors
///
/// Returns `RepositoryError` if either query fails.
pub async fn refresh_from_db(
    center: &NotificationCenter,
    pool: &PgPool,
    op: ChangeOp,
) -> Result<(), RepositoryError> {
    let repo = OrderRepository::new(pool);
    let pending = repo.count_pending().await?;
    let recent = repo.list_recent(RECENT_ORDERS).await?;
    center.refresh(op, pending, &recent).await;
    Ok(())
}

/// Spawn the listener task. It reconnects after a fixed delay on any failure.
pub fn spawn_listener(pool: PgPool, center: NotificationCenter) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = listen(&pool, &center).await {
                tracing::warn!(
                    error = %e,
                    retry_in_secs = RECONNECT_DELAY.as_secs(),
                    "Order change listener stopped"
                );
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

async fn listen(pool: &PgPool, center: &NotificationCenter) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(ORDERS_CHANNEL).await?;
    tracing::info!(channel = ORDERS_CHANNEL, "Listening for order changes");

    // Catch up on anything missed while disconnected.
    if let Err(e) = refresh_from_db(center, pool, ChangeOp::Update).await {
        tracing::error!(error = %e, "Failed to load notification state");
    }

    loop {
        let notification = listener.recv().await?;
        let change: OrderChange = match serde_json::from_str(notification.payload()) {
            Ok(change) => change,
            Err(e) => {
                tracing::warn!(error = %e, payload = notification.payload(), "Ignoring malformed order change");
                continue;
            }
        };

        tracing::debug!(op = ?change.op, order_id = %change.id, "Order change received");
        match change.op {
            ChangeOp::Insert => center.record_insert(&change, Utc::now()).await,
            op @ (ChangeOp::Update | ChangeOp::Delete) => {
                if let Err(e) = refresh_from_db(center, pool, op).await {
                    tracing::error!(error = %e, "Failed to refresh notifications");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use luxeshopy_core::{OrderId, OrderStatus, PaymentStatus, Price};

    fn insert(name: Option<&str>) -> OrderChange {
        OrderChange {
            op: ChangeOp::Insert,
            id: Uuid::new_v4(),
            customer_name: name.map(String::from),
            total_price: Some("549.00".to_string()),
        }
    }

    fn order(name: &str, total: i64) -> Order {
        Order {
            id: OrderId::random(),
            customer_name: name.to_string(),
            phone: None,
            address: None,
            total_price: Price::from_dinars(total),
            items: Vec::new(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Paid,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_change_payload_parses_trigger_json() {
        let raw = r#"{"op":"INSERT","id":"6f1c1f7e-8a54-4b3e-9a3e-0c1d2e3f4a5b","customer_name":null,"total_price":"120.00"}"#;
        let change: OrderChange = serde_json::from_str(raw).unwrap();
        assert_eq!(change.op, ChangeOp::Insert);
        assert_eq!(change.customer(), "Guest");
    }

    #[tokio::test]
    async fn test_insert_prepends_and_counts() {
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();

        center.record_insert(&insert(Some("Amira")), Utc::now()).await;

        let snap = center.snapshot().await;
        assert_eq!(snap.pending_count, 1);
        assert_eq!(snap.unread_count, 1);
        assert_eq!(snap.unread_notification_count, 1);
        assert_eq!(snap.notifications[0].title, "New Order");
        assert_eq!(snap.notifications[0].message, "Order received from Amira");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.op, ChangeOp::Insert);
        assert_eq!(event.toast.as_deref(), Some("New Order: 549.00 TND"));
    }

    #[tokio::test]
    async fn test_list_keeps_last_ten() {
        let center = NotificationCenter::new();
        for _ in 0..12 {
            center.record_insert(&insert(None), Utc::now()).await;
        }
        let snap = center.snapshot().await;
        assert_eq!(snap.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(snap.pending_count, 12);
        assert_eq!(snap.unread_notification_count, 12);
    }

    #[tokio::test]
    async fn test_refresh_replaces_list_with_read_entries() {
        let center = NotificationCenter::new();
        center.record_insert(&insert(Some("Old")), Utc::now()).await;
        center
            .refresh(ChangeOp::Update, 3, &[order("Youssef", 120), order("", 80)])
            .await;

        let snap = center.snapshot().await;
        assert_eq!(snap.pending_count, 3);
        assert_eq!(snap.unread_count, 0);
        assert_eq!(snap.notifications.len(), 2);
        assert_eq!(snap.notifications[0].message, "Order from Youssef - 120.00 TND");
        assert_eq!(snap.notifications[1].message, "Order from Guest - 80.00 TND");
        // badge counter survives a refresh
        assert_eq!(snap.unread_notification_count, 1);
    }

    #[tokio::test]
    async fn test_mark_read_and_reset() {
        let center = NotificationCenter::new();
        center.record_insert(&insert(Some("A")), Utc::now()).await;
        center.record_insert(&insert(Some("B")), Utc::now()).await;

        let snap = center.mark_all_read().await;
        assert_eq!(snap.unread_count, 0);
        assert_eq!(snap.unread_notification_count, 2);

        let snap = center.reset_count().await;
        assert_eq!(snap.unread_notification_count, 0);
        assert_eq!(snap.pending_count, 2);
    }
}
