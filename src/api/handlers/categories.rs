use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::handlers::AppState;
use crate::auth::AuthUser;
use crate::db::{
    self,
    models::{Category, NewCategory, UpdateCategory},
};
use crate::error::Result;

/// GET /api/v1/categories - List the user's categories
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Category>>> {
    let categories = db::categories::list_categories(&state.pool, user.id).await?;
    Ok(Json(categories))
}

/// POST /api/v1/categories - Create a category
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(new_category): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = db::categories::create_category(&state.pool, user.id, &new_category).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Category>> {
    let category = db::categories::get_category(&state.pool, user.id, category_id).await?;
    Ok(Json(category))
}

/// PATCH /api/v1/categories/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(category_id): Path<Uuid>,
    Json(update): Json<UpdateCategory>,
) -> Result<Json<Category>> {
    let category =
        db::categories::update_category(&state.pool, user.id, category_id, &update).await?;
    Ok(Json(category))
}

/// DELETE /api/v1/categories/:id
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode> {
    db::categories::delete_category(&state.pool, user.id, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
