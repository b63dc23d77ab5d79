use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Create an expense for a user
pub async fn create_expense(
    pool: &DbPool,
    user_id: Uuid,
    new_expense: &NewExpense,
) -> Result<Expense> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    let expense = sqlx::query_as::<_, Expense>(
        r#"
        INSERT INTO expenses (id, user_id, name, amount, category_id, frequency,
                              interval_days, next_due_date, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, TRUE, ?, ?)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&new_expense.name)
    .bind(new_expense.amount)
    .bind(new_expense.category_id)
    .bind(new_expense.frequency)
    .bind(new_expense.interval_days)
    .bind(new_expense.next_due_date)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(expense)
}

/// Get an expense scoped to its owner
pub async fn get_expense(pool: &DbPool, user_id: Uuid, expense_id: Uuid) -> Result<Expense> {
    let expense =
        sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = ? AND user_id = ?")
            .bind(expense_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| Error::NotFound("Expense not found".to_string()))?;

    Ok(expense)
}

/// List a user's expenses
pub async fn list_expenses(pool: &DbPool, user_id: Uuid) -> Result<Vec<Expense>> {
    let expenses = sqlx::query_as::<_, Expense>(
        "SELECT * FROM expenses WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(expenses)
}

/// Recurring expenses across all users whose next due date has passed
pub async fn list_due_expenses(pool: &DbPool, as_of: DateTime<Utc>) -> Result<Vec<Expense>> {
    let expenses = sqlx::query_as::<_, Expense>(
        r#"
        SELECT * FROM expenses
        WHERE is_active = TRUE AND next_due_date IS NOT NULL AND next_due_date <= ?
        ORDER BY next_due_date
        "#,
    )
    .bind(as_of)
    .fetch_all(pool)
    .await?;

    Ok(expenses)
}

/// Update an expense; only provided fields change
pub async fn update_expense(
    pool: &DbPool,
    user_id: Uuid,
    expense_id: Uuid,
    update: &UpdateExpense,
) -> Result<Expense> {
    let current = get_expense(pool, user_id, expense_id).await?;
    let now = Utc::now();

    let expense = sqlx::query_as::<_, Expense>(
        r#"
        UPDATE expenses
        SET name = ?, amount = ?, category_id = ?, frequency = ?,
            interval_days = ?, next_due_date = ?, is_active = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        RETURNING *
        "#,
    )
    .bind(update.name.as_ref().unwrap_or(&current.name))
    .bind(update.amount.unwrap_or(current.amount))
    .bind(update.category_id.or(current.category_id))
    .bind(update.frequency.unwrap_or(current.frequency))
    .bind(update.interval_days.or(current.interval_days))
    .bind(update.next_due_date.or(current.next_due_date))
    .bind(update.is_active.unwrap_or(current.is_active))
    .bind(now)
    .bind(expense_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(expense)
}

/// Advance a recurring expense to its next occurrence (or deactivate a one-time bill)
pub async fn advance_due_date(
    pool: &DbPool,
    expense_id: Uuid,
    next_due_date: Option<DateTime<Utc>>,
) -> Result<()> {
    let now = Utc::now();

    match next_due_date {
        Some(due) => {
            sqlx::query("UPDATE expenses SET next_due_date = ?, updated_at = ? WHERE id = ?")
                .bind(due)
                .bind(now)
                .bind(expense_id)
                .execute(pool)
                .await?;
        }
        None => {
            sqlx::query(
                "UPDATE expenses SET is_active = FALSE, next_due_date = NULL, updated_at = ? WHERE id = ?",
            )
            .bind(now)
            .bind(expense_id)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

/// Delete an expense
pub async fn delete_expense(pool: &DbPool, user_id: Uuid, expense_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
        .bind(expense_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Expense not found".to_string()));
    }

    Ok(())
}
