//! In-process fan-out of notification events to connected WebSocket clients.

use crate::db::models::Notification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Wire format pushed over the WebSocket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationEvent {
    fn from(notification: &Notification) -> Self {
        Self {
            kind: notification.kind.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            id: notification.id,
            status: notification.status.clone(),
            created_at: notification.created_at,
        }
    }
}

/// Fan-out registry keyed by user id. A user may hold several sockets at
/// once; every open one receives every event. Events are not persisted here
/// and there is no replay for sockets that were closed (REST listing is the
/// catch-up path).
#[derive(Default)]
pub struct NotificationHub {
    subscribers: RwLock<HashMap<Uuid, Vec<mpsc::UnboundedSender<NotificationEvent>>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for a user; the returned receiver yields events
    /// until the hub prunes the sender on a failed publish.
    pub fn subscribe(&self, user_id: Uuid) -> mpsc::UnboundedReceiver<NotificationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut subscribers = self.subscribers.write().expect("hub lock poisoned");
        subscribers.entry(user_id).or_default().push(tx);

        debug!("WebSocket subscriber added for user {}", user_id);
        rx
    }

    /// Push an event to all of a user's live subscribers, pruning dead ones
    pub fn publish(&self, user_id: Uuid, event: NotificationEvent) {
        let mut subscribers = self.subscribers.write().expect("hub lock poisoned");

        if let Some(senders) = subscribers.get_mut(&user_id) {
            senders.retain(|sender| sender.send(event.clone()).is_ok());
            if senders.is_empty() {
                subscribers.remove(&user_id);
            }
        }
    }

    /// Number of live subscriptions for a user
    pub fn subscriber_count(&self, user_id: Uuid) -> usize {
        self.subscribers
            .read()
            .expect("hub lock poisoned")
            .get(&user_id)
            .map(|senders| senders.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(title: &str) -> NotificationEvent {
        NotificationEvent {
            kind: "bill_due".to_string(),
            title: title.to_string(),
            message: "msg".to_string(),
            id: Uuid::new_v4(),
            status: "alert".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers_of_user() {
        let hub = NotificationHub::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut rx1 = hub.subscribe(user);
        let mut rx2 = hub.subscribe(user);
        let mut rx_other = hub.subscribe(other);

        hub.publish(user, event("hello"));

        assert_eq!(rx1.recv().await.unwrap().title, "hello");
        assert_eq!(rx2.recv().await.unwrap().title, "hello");
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_subscribers_are_pruned() {
        let hub = NotificationHub::new();
        let user = Uuid::new_v4();

        let rx = hub.subscribe(user);
        assert_eq!(hub.subscriber_count(user), 1);

        drop(rx);
        hub.publish(user, event("into the void"));
        assert_eq!(hub.subscriber_count(user), 0);
    }

    #[test]
    fn test_event_wire_format_uses_type_field() {
        let serialized = serde_json::to_value(event("t")).unwrap();
        assert_eq!(serialized["type"], "bill_due");
        assert!(serialized.get("kind").is_none());
    }
}
