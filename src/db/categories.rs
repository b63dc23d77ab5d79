use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// Create a category for a user
pub async fn create_category(
    pool: &DbPool,
    user_id: Uuid,
    new_category: &NewCategory,
) -> Result<Category> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (id, user_id, name, description, default_percentage,
                                custom_percentage, is_default, is_fixed, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&new_category.name)
    .bind(&new_category.description)
    .bind(new_category.default_percentage)
    .bind(new_category.custom_percentage)
    .bind(new_category.is_default)
    .bind(new_category.is_fixed)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(category)
}

/// Get a category scoped to its owner
pub async fn get_category(pool: &DbPool, user_id: Uuid, category_id: Uuid) -> Result<Category> {
    let category =
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ? AND user_id = ?")
            .bind(category_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| Error::NotFound("Category not found".to_string()))?;

    Ok(category)
}

/// Case-insensitive lookup by name for a user
pub async fn get_category_by_name(
    pool: &DbPool,
    user_id: Uuid,
    name: &str,
) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE user_id = ? AND LOWER(name) = LOWER(?)",
    )
    .bind(user_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(category)
}

/// List a user's categories
pub async fn list_categories(pool: &DbPool, user_id: Uuid) -> Result<Vec<Category>> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE user_id = ? ORDER BY name")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    Ok(categories)
}

/// Update a category; only provided fields change
pub async fn update_category(
    pool: &DbPool,
    user_id: Uuid,
    category_id: Uuid,
    update: &UpdateCategory,
) -> Result<Category> {
    let current = get_category(pool, user_id, category_id).await?;
    let now = Utc::now();

    let category = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = ?, description = ?, default_percentage = ?,
            custom_percentage = ?, is_fixed = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        RETURNING *
        "#,
    )
    .bind(update.name.as_ref().unwrap_or(&current.name))
    .bind(update.description.as_ref().or(current.description.as_ref()))
    .bind(update.default_percentage.unwrap_or(current.default_percentage))
    .bind(update.custom_percentage.or(current.custom_percentage))
    .bind(update.is_fixed.unwrap_or(current.is_fixed))
    .bind(now)
    .bind(category_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(category)
}

/// Delete a category
pub async fn delete_category(pool: &DbPool, user_id: Uuid, category_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
        .bind(category_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Category not found".to_string()));
    }

    Ok(())
}
