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
    models::{Goal, NewGoal, UpdateGoal},
};
use crate::error::{Error, Result};

/// GET /api/v1/goals - List the user's savings goals
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Goal>>> {
    let goals = db::goals::list_goals(&state.pool, user.id).await?;
    Ok(Json(goals))
}

/// POST /api/v1/goals - Create a savings goal
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(new_goal): Json<NewGoal>,
) -> Result<(StatusCode, Json<Goal>)> {
    if new_goal.target_amount <= 0.0 {
        return Err(Error::Validation(
            "Target amount must be positive".to_string(),
        ));
    }

    let goal = db::goals::create_goal(&state.pool, user.id, &new_goal).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

/// GET /api/v1/goals/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<Goal>> {
    let goal = db::goals::get_goal(&state.pool, user.id, goal_id).await?;
    Ok(Json(goal))
}

/// PATCH /api/v1/goals/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(goal_id): Path<Uuid>,
    Json(update): Json<UpdateGoal>,
) -> Result<Json<Goal>> {
    let goal = db::goals::update_goal(&state.pool, user.id, goal_id, &update).await?;
    Ok(Json(goal))
}

/// DELETE /api/v1/goals/:id
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(goal_id): Path<Uuid>,
) -> Result<StatusCode> {
    db::goals::delete_goal(&state.pool, user.id, goal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
