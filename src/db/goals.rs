use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// Create a savings goal for a user
pub async fn create_goal(pool: &DbPool, user_id: Uuid, new_goal: &NewGoal) -> Result<Goal> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    let goal = sqlx::query_as::<_, Goal>(
        r#"
        INSERT INTO goals (id, user_id, target_amount, deadline, saved_amount, is_active,
                           created_at, updated_at)
        VALUES (?, ?, ?, ?, 0.0, TRUE, ?, ?)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(new_goal.target_amount)
    .bind(new_goal.deadline)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(goal)
}

/// Get a goal scoped to its owner
pub async fn get_goal(pool: &DbPool, user_id: Uuid, goal_id: Uuid) -> Result<Goal> {
    let goal = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = ? AND user_id = ?")
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Goal not found".to_string()))?;

    Ok(goal)
}

/// List a user's goals
pub async fn list_goals(pool: &DbPool, user_id: Uuid) -> Result<Vec<Goal>> {
    let goals =
        sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE user_id = ? ORDER BY deadline")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    Ok(goals)
}

/// Update a goal; only provided fields change
pub async fn update_goal(
    pool: &DbPool,
    user_id: Uuid,
    goal_id: Uuid,
    update: &UpdateGoal,
) -> Result<Goal> {
    let current = get_goal(pool, user_id, goal_id).await?;
    let now = Utc::now();

    let goal = sqlx::query_as::<_, Goal>(
        r#"
        UPDATE goals
        SET target_amount = ?, deadline = ?, saved_amount = ?, is_active = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        RETURNING *
        "#,
    )
    .bind(update.target_amount.unwrap_or(current.target_amount))
    .bind(update.deadline.unwrap_or(current.deadline))
    .bind(update.saved_amount.unwrap_or(current.saved_amount))
    .bind(update.is_active.unwrap_or(current.is_active))
    .bind(now)
    .bind(goal_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(goal)
}

/// Delete a goal
pub async fn delete_goal(pool: &DbPool, user_id: Uuid, goal_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM goals WHERE id = ? AND user_id = ?")
        .bind(goal_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Goal not found".to_string()));
    }

    Ok(())
}
