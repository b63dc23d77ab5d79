use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Create a transaction for a user
pub async fn create_transaction(
    pool: &DbPool,
    user_id: Uuid,
    new_transaction: &NewTransaction,
) -> Result<Transaction> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (id, user_id, description, amount, category_id,
                                  transaction_date, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&new_transaction.description)
    .bind(new_transaction.amount)
    .bind(new_transaction.category_id)
    .bind(new_transaction.transaction_date)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(transaction)
}

/// Get a transaction scoped to its owner
pub async fn get_transaction(
    pool: &DbPool,
    user_id: Uuid,
    transaction_id: Uuid,
) -> Result<Transaction> {
    let transaction =
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = ? AND user_id = ?")
            .bind(transaction_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| Error::NotFound("Transaction not found".to_string()))?;

    Ok(transaction)
}

/// List a user's transactions, newest first
pub async fn list_transactions(pool: &DbPool, user_id: Uuid) -> Result<Vec<Transaction>> {
    let transactions = sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE user_id = ? ORDER BY transaction_date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

/// The user's most recent transactions, for resolving "last transaction" references
pub async fn list_recent_transactions(
    pool: &DbPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<Transaction>> {
    let transactions = sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE user_id = ? ORDER BY transaction_date DESC LIMIT ?",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

/// Transactions within a half-open date range
pub async fn list_transactions_in_range(
    pool: &DbPool,
    user_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Transaction>> {
    let transactions = sqlx::query_as::<_, Transaction>(
        r#"
        SELECT * FROM transactions
        WHERE user_id = ? AND transaction_date >= ? AND transaction_date < ?
        ORDER BY transaction_date
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

/// Update a transaction; only provided fields change
pub async fn update_transaction(
    pool: &DbPool,
    user_id: Uuid,
    transaction_id: Uuid,
    update: &UpdateTransaction,
) -> Result<Transaction> {
    let current = get_transaction(pool, user_id, transaction_id).await?;
    let now = Utc::now();

    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        UPDATE transactions
        SET description = ?, amount = ?, category_id = ?, transaction_date = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        RETURNING *
        "#,
    )
    .bind(update.description.as_ref().unwrap_or(&current.description))
    .bind(update.amount.unwrap_or(current.amount))
    .bind(update.category_id.or(current.category_id))
    .bind(update.transaction_date.unwrap_or(current.transaction_date))
    .bind(now)
    .bind(transaction_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(transaction)
}

/// Delete a transaction
pub async fn delete_transaction(pool: &DbPool, user_id: Uuid, transaction_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
        .bind(transaction_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Transaction not found".to_string()));
    }

    Ok(())
}
