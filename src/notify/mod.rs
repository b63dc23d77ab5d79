pub mod hub;
pub mod scheduler;

pub use hub::{NotificationEvent, NotificationHub};

use crate::db::{
    self,
    models::{NewNotification, Notification},
    DbPool,
};
use crate::error::Result;
use std::sync::Arc;

/// Persist a notification and push it to the owner's open sockets.
/// The row is committed before anything is published, so subscribers only
/// ever see notifications that the REST listing will also return.
pub async fn dispatch(
    pool: &DbPool,
    hub: &Arc<NotificationHub>,
    new: NewNotification,
) -> Result<Notification> {
    let notification = db::notifications::create_notification(pool, &new).await?;
    hub.publish(notification.user_id, NotificationEvent::from(&notification));
    Ok(notification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{notification_kind, notification_status, NewUser};
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_dispatch_persists_then_publishes() {
        let pool = test_pool().await;
        let hub = Arc::new(NotificationHub::new());

        let user = db::users::create_user(
            &pool,
            &NewUser {
                email: "dispatch@example.com".to_string(),
                hashed_password: "hash".to_string(),
                full_name: None,
                is_superuser: false,
                is_verified: false,
                google_id: None,
            },
        )
        .await
        .unwrap();

        let mut rx = hub.subscribe(user.id);

        let notification = dispatch(
            &pool,
            &hub,
            NewNotification {
                user_id: user.id,
                title: "Budget alert".to_string(),
                message: "You overspent".to_string(),
                kind: notification_kind::OVERSPEND.to_string(),
                status: notification_status::ALERT.to_string(),
                category_id: None,
            },
        )
        .await
        .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.id, notification.id);
        assert_eq!(event.kind, notification_kind::OVERSPEND);

        // the pushed event corresponds to a persisted row
        let stored = db::notifications::get_notification(&pool, user.id, notification.id)
            .await
            .unwrap();
        assert_eq!(stored.title, "Budget alert");
    }
}
