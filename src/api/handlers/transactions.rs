use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::api::handlers::AppState;
use crate::api::models::ImportReport;
use crate::auth::AuthUser;
use crate::db::{
    self,
    models::{NewTransaction, Transaction, UpdateTransaction},
};
use crate::error::{Error, Result};
use crate::imports;

/// GET /api/v1/transactions - List the user's transactions
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Transaction>>> {
    let transactions = db::transactions::list_transactions(&state.pool, user.id).await?;
    Ok(Json(transactions))
}

/// POST /api/v1/transactions - Record a transaction
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>)> {
    let transaction =
        db::transactions::create_transaction(&state.pool, user.id, &new_transaction).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET /api/v1/transactions/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Transaction>> {
    let transaction =
        db::transactions::get_transaction(&state.pool, user.id, transaction_id).await?;
    Ok(Json(transaction))
}

/// PATCH /api/v1/transactions/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(transaction_id): Path<Uuid>,
    Json(update): Json<UpdateTransaction>,
) -> Result<Json<Transaction>> {
    let transaction =
        db::transactions::update_transaction(&state.pool, user.id, transaction_id, &update).await?;
    Ok(Json(transaction))
}

/// DELETE /api/v1/transactions/:id
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode> {
    db::transactions::delete_transaction(&state.pool, user.id, transaction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/transactions/import - Import spending rows from a bank
/// statement CSV sent as the request body.
pub async fn import_statement(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: String,
) -> Result<Json<ImportReport>> {
    if body.trim().is_empty() {
        return Err(Error::Validation("Empty statement".to_string()));
    }

    let parsed = imports::parse_bank_statement(&body);

    let mut imported = 0;
    for entry in &parsed.entries {
        db::transactions::create_transaction(
            &state.pool,
            user.id,
            &NewTransaction {
                description: entry.description.clone(),
                amount: entry.amount,
                category_id: None,
                transaction_date: entry.date,
            },
        )
        .await?;
        imported += 1;
    }

    info!(
        "Imported {} transactions for user {} ({} rows skipped)",
        imported, user.id, parsed.skipped
    );

    Ok(Json(ImportReport {
        imported,
        skipped: parsed.skipped,
    }))
}
