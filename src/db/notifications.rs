use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// Filters accepted by the notification listing
#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub unread_only: bool,
    pub kind: Option<String>,
}

/// Persist a notification row
pub async fn create_notification(pool: &DbPool, new: &NewNotification) -> Result<Notification> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (id, user_id, title, message, kind, status, category_id,
                                   is_read, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, FALSE, ?)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(new.user_id)
    .bind(&new.title)
    .bind(&new.message)
    .bind(&new.kind)
    .bind(&new.status)
    .bind(new.category_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

/// Get a notification scoped to its owner
pub async fn get_notification(
    pool: &DbPool,
    user_id: Uuid,
    notification_id: Uuid,
) -> Result<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE id = ? AND user_id = ?",
    )
    .bind(notification_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound("Notification not found".to_string()))?;

    Ok(notification)
}

/// List a user's notifications, newest first
pub async fn list_notifications(
    pool: &DbPool,
    user_id: Uuid,
    filter: &NotificationFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Notification>> {
    // Two optional filters; enumerate the combinations rather than build SQL at runtime
    let notifications = match (&filter.kind, filter.unread_only) {
        (Some(kind), true) => {
            sqlx::query_as::<_, Notification>(
                r#"
                SELECT * FROM notifications
                WHERE user_id = ? AND kind = ? AND is_read = FALSE
                ORDER BY created_at DESC LIMIT ? OFFSET ?
                "#,
            )
            .bind(user_id)
            .bind(kind)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        (Some(kind), false) => {
            sqlx::query_as::<_, Notification>(
                r#"
                SELECT * FROM notifications
                WHERE user_id = ? AND kind = ?
                ORDER BY created_at DESC LIMIT ? OFFSET ?
                "#,
            )
            .bind(user_id)
            .bind(kind)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        (None, true) => {
            sqlx::query_as::<_, Notification>(
                r#"
                SELECT * FROM notifications
                WHERE user_id = ? AND is_read = FALSE
                ORDER BY created_at DESC LIMIT ? OFFSET ?
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        (None, false) => {
            sqlx::query_as::<_, Notification>(
                r#"
                SELECT * FROM notifications
                WHERE user_id = ?
                ORDER BY created_at DESC LIMIT ? OFFSET ?
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(notifications)
}

/// Count a user's unread notifications
pub async fn count_unread(pool: &DbPool, user_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = FALSE",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// True when the user already has an unread notification of this kind for a category
pub async fn has_unread_for_category(
    pool: &DbPool,
    user_id: Uuid,
    kind: &str,
    category_id: Uuid,
) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM notifications
        WHERE user_id = ? AND kind = ? AND category_id = ? AND is_read = FALSE
        "#,
    )
    .bind(user_id)
    .bind(kind)
    .bind(category_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Mark one notification read, returning the updated row
pub async fn mark_read(pool: &DbPool, user_id: Uuid, notification_id: Uuid) -> Result<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        UPDATE notifications SET is_read = TRUE
        WHERE id = ? AND user_id = ?
        RETURNING *
        "#,
    )
    .bind(notification_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound("Notification not found".to_string()))?;

    Ok(notification)
}

/// Mark all of a user's notifications read, returning how many changed
pub async fn mark_all_read(pool: &DbPool, user_id: Uuid) -> Result<u64> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = ? AND is_read = FALSE")
            .bind(user_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, users};

    async fn seed_user(pool: &DbPool, email: &str) -> Uuid {
        users::create_user(
            pool,
            &NewUser {
                email: email.to_string(),
                hashed_password: "hash".to_string(),
                full_name: None,
                is_superuser: false,
                is_verified: false,
                google_id: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn sample(user_id: Uuid, kind: &str) -> NewNotification {
        NewNotification {
            user_id,
            title: "Bill due".to_string(),
            message: "Rent is due tomorrow".to_string(),
            kind: kind.to_string(),
            status: notification_status::ALERT.to_string(),
            category_id: None,
        }
    }

    #[tokio::test]
    async fn test_notification_lifecycle() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool, "n1@example.com").await;

        let n1 = create_notification(&pool, &sample(user_id, notification_kind::BILL_DUE))
            .await
            .unwrap();
        create_notification(&pool, &sample(user_id, notification_kind::OVERSPEND))
            .await
            .unwrap();

        assert_eq!(count_unread(&pool, user_id).await.unwrap(), 2);

        let all = list_notifications(&pool, user_id, &NotificationFilter::default(), 50, 0)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let filtered = list_notifications(
            &pool,
            user_id,
            &NotificationFilter {
                unread_only: true,
                kind: Some(notification_kind::BILL_DUE.to_string()),
            },
            50,
            0,
        )
        .await
        .unwrap();
        assert_eq!(filtered.len(), 1);

        let read = mark_read(&pool, user_id, n1.id).await.unwrap();
        assert!(read.is_read);
        assert_eq!(count_unread(&pool, user_id).await.unwrap(), 1);

        // only the remaining unread row is flipped
        assert_eq!(mark_all_read(&pool, user_id).await.unwrap(), 1);
        assert_eq!(count_unread(&pool, user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_is_user_scoped() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "n2@example.com").await;
        let other = seed_user(&pool, "n3@example.com").await;

        let n = create_notification(&pool, &sample(owner, notification_kind::BILL_DUE))
            .await
            .unwrap();

        assert!(mark_read(&pool, other, n.id).await.is_err());
        assert!(get_notification(&pool, other, n.id).await.is_err());
    }
}
