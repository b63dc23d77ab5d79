use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// Create a new user
pub async fn create_user(pool: &DbPool, new_user: &NewUser) -> Result<User> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, hashed_password, is_active, is_superuser, is_verified,
                           full_name, google_id, created_at, updated_at)
        VALUES (?, ?, ?, TRUE, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&new_user.email)
    .bind(&new_user.hashed_password)
    .bind(new_user.is_superuser)
    .bind(new_user.is_verified)
    .bind(&new_user.full_name)
    .bind(&new_user.google_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return Error::Validation("A user with this email already exists".to_string());
            }
        }
        Error::Database(e)
    })?;

    Ok(user)
}

/// Get user by ID
pub async fn get_user(pool: &DbPool, user_id: Uuid) -> Result<User> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    Ok(user)
}

/// Get user by email
pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// List all users, newest first
pub async fn list_users(pool: &DbPool, limit: i64, offset: i64) -> Result<Vec<User>> {
    let users =
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

    Ok(users)
}

/// List ids of users with a configured monthly income (the scheduler's working set)
pub async fn list_user_ids_with_income(pool: &DbPool) -> Result<Vec<Uuid>> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM users WHERE is_active = TRUE AND monthly_income IS NOT NULL",
    )
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Update profile fields; only provided fields change
pub async fn update_user(pool: &DbPool, user_id: Uuid, update: &UpdateUser) -> Result<User> {
    let current = get_user(pool, user_id).await?;
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET full_name = ?, monthly_income = ?, savings_goal_amount = ?,
            savings_goal_deadline = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(update.full_name.as_ref().or(current.full_name.as_ref()))
    .bind(update.monthly_income.or(current.monthly_income))
    .bind(update.savings_goal_amount.or(current.savings_goal_amount))
    .bind(update.savings_goal_deadline.or(current.savings_goal_deadline))
    .bind(now)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Attach Google identity details after an OAuth login
pub async fn link_google_account(
    pool: &DbPool,
    user_id: Uuid,
    google_id: &str,
    full_name: Option<&str>,
) -> Result<User> {
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET google_id = ?, is_verified = TRUE,
            full_name = COALESCE(?, full_name), updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(google_id)
    .bind(full_name)
    .bind(now)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Deactivate an account
pub async fn deactivate_user(pool: &DbPool, user_id: Uuid) -> Result<()> {
    let now = Utc::now();

    sqlx::query("UPDATE users SET is_active = FALSE, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
