//! Realtime order events and the notification center API.

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::State,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
    routing::{get, post},
};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::instrument;

use luxeshopy_core::ActionResult;

use crate::middleware::RequireAdmin;
use crate::realtime::{NotificationSnapshot, RealtimeEvent};
use crate::state::AppState;

/// SSE event name for order changes.
const ORDER_EVENT: &str = "order";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/events", get(stream))
        .route("/admin/api/notifications", get(notifications))
        .route("/admin/api/notifications/read", post(mark_read))
        .route("/admin/api/notifications/reset", post(reset_count))
}

fn to_sse(event: &RealtimeEvent) -> Event {
    let json = serde_json::to_string(event).unwrap_or_else(|_| {
        r#"{"op":"UPDATE"}"#.to_string()
    });
    Event::default().event(ORDER_EVENT).data(json)
}

/// Turn a broadcast receiver into SSE events. Lagging receivers skip ahead.
fn event_stream(
    mut receiver: broadcast::Receiver<RealtimeEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => yield Ok(to_sse(&event)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "SSE client lagged behind order events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

/// GET /admin/events
#[instrument(skip(_admin, state))]
pub async fn stream(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(event_stream(state.notifications().subscribe())).keep_alive(KeepAlive::default())
}

/// GET /admin/api/notifications
#[instrument(skip(_admin, state))]
pub async fn notifications(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<ActionResult<NotificationSnapshot>> {
    Json(ActionResult::ok(state.notifications().snapshot().await))
}

/// POST /admin/api/notifications/read
#[instrument(skip(_admin, state))]
pub async fn mark_read(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<ActionResult<NotificationSnapshot>> {
    Json(ActionResult::ok(state.notifications().mark_all_read().await))
}

/// POST /admin/api/notifications/reset
#[instrument(skip(_admin, state))]
pub async fn reset_count(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<ActionResult<NotificationSnapshot>> {
    Json(ActionResult::ok(state.notifications().reset_count().await))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::realtime::{ChangeOp, NotificationCenter, OrderChange};
    use chrono::Utc;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_stream_forwards_center_events() {
        let center = NotificationCenter::new();
        let stream = event_stream(center.subscribe());
        futures::pin_mut!(stream);

        let change = OrderChange {
            op: ChangeOp::Insert,
            id: uuid::Uuid::new_v4(),
            customer_name: Some("Amira".to_string()),
            total_price: Some("120.00".to_string()),
        };
        center.record_insert(&change, Utc::now()).await;

        let event = stream.next().await.unwrap();
        assert!(event.is_ok());
    }

    #[tokio::test]
    async fn test_stream_ends_when_center_dropped() {
        let center = NotificationCenter::new();
        let stream = event_stream(center.subscribe());
        drop(center);
        futures::pin_mut!(stream);
        assert!(stream.next().await.is_none());
    }
}
