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
    models::{Expense, NewExpense, UpdateExpense},
};
use crate::error::{Error, Result};

/// GET /api/v1/expenses - List the user's expenses
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Expense>>> {
    let expenses = db::expenses::list_expenses(&state.pool, user.id).await?;
    Ok(Json(expenses))
}

/// POST /api/v1/expenses - Create an expense
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(new_expense): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>)> {
    if new_expense.amount <= 0.0 {
        return Err(Error::Validation("Amount must be positive".to_string()));
    }

    let expense = db::expenses::create_expense(&state.pool, user.id, &new_expense).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/v1/expenses/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<Expense>> {
    let expense = db::expenses::get_expense(&state.pool, user.id, expense_id).await?;
    Ok(Json(expense))
}

/// PATCH /api/v1/expenses/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(expense_id): Path<Uuid>,
    Json(update): Json<UpdateExpense>,
) -> Result<Json<Expense>> {
    let expense = db::expenses::update_expense(&state.pool, user.id, expense_id, &update).await?;
    Ok(Json(expense))
}

/// DELETE /api/v1/expenses/:id
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode> {
    db::expenses::delete_expense(&state.pool, user.id, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
