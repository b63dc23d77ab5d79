pub mod auth;
pub mod categories;
pub mod chatbot;
pub mod dashboard;
pub mod expenses;
pub mod goals;
pub mod notifications;
pub mod transactions;
pub mod users;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ai::OpenRouterClient;
use crate::auth::google::GoogleAuthClient;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::notify::NotificationHub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub settings: Settings,
    pub hub: Arc<NotificationHub>,
    pub google: GoogleAuthClient,
    /// None when no OPENROUTER_API_KEY is configured
    pub ai: Option<OpenRouterClient>,
}

impl AppState {
    /// The AI client, or a config error for AI-backed endpoints
    pub fn ai_client(&self) -> Result<&OpenRouterClient> {
        self.ai
            .as_ref()
            .ok_or_else(|| Error::Config("AI features are not configured".to_string()))
    }
}

/// GET / - Service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Budget Pay API is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "register": "/api/v1/auth/register",
            "login": "/api/v1/auth/jwt/login",
            "logout": "/api/v1/auth/jwt/logout",
            "profile": "/api/v1/users/me",
            "notifications": "/api/v1/notification/",
        }
    }))
}

/// GET /health - Liveness check
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /ready - Readiness check (verifies database connectivity)
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(json!({ "status": "ready" })))
}
