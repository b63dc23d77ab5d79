use axum::{extract::State, Json};

use crate::api::handlers::AppState;
use crate::api::models::{MessageResponse, UserResponse};
use crate::auth::{AuthUser, SuperUser};
use crate::db::{self, models::UpdateUser};
use crate::error::Result;

/// GET /api/v1/users/me - Current profile
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// PATCH /api/v1/users/me - Update profile fields
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(update): Json<UpdateUser>,
) -> Result<Json<UserResponse>> {
    let updated = db::users::update_user(&state.pool, user.id, &update).await?;
    Ok(Json(updated.into()))
}

/// GET /api/v1/users/list - All accounts (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    SuperUser(_admin): SuperUser,
) -> Result<Json<Vec<UserResponse>>> {
    let users = db::users::list_users(&state.pool, 500, 0).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/users/deactivate - Deactivate the current account
pub async fn deactivate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageResponse>> {
    db::users::deactivate_user(&state.pool, user.id).await?;

    Ok(Json(MessageResponse {
        message: "Account deactivated successfully".to_string(),
    }))
}
