use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    response::Response,
    Json,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ai::{prompts, snapshot, ChatOptions};
use crate::api::handlers::AppState;
use crate::api::models::*;
use crate::auth::{jwt, AuthUser};
use crate::db::{
    self,
    models::{notification_kind, notification_status, NewNotification, Notification, User},
    notifications::NotificationFilter,
};
use crate::error::Result;
use crate::notify;

/// GET /api/v1/notification/ - List notifications, newest first
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<NotificationListParams>,
) -> Result<Json<Vec<Notification>>> {
    let limit = params.limit.min(state.settings.pagination.api_max_limit);

    let filter = NotificationFilter {
        unread_only: params.unread_only,
        kind: params.kind,
    };

    let notifications = db::notifications::list_notifications(
        &state.pool,
        user.id,
        &filter,
        limit as i64,
        params.offset as i64,
    )
    .await?;

    Ok(Json(notifications))
}

/// GET /api/v1/notification/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UnreadCountResponse>> {
    let count = db::notifications::count_unread(&state.pool, user.id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// GET /api/v1/notification/:id
pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>> {
    let notification =
        db::notifications::get_notification(&state.pool, user.id, notification_id).await?;
    Ok(Json(notification))
}

/// POST /api/v1/notification/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>> {
    let notification = db::notifications::mark_read(&state.pool, user.id, notification_id).await?;
    Ok(Json(notification))
}

/// POST /api/v1/notification/read_all
pub async fn read_all(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MarkAllReadResponse>> {
    let marked_read = db::notifications::mark_all_read(&state.pool, user.id).await?;
    Ok(Json(MarkAllReadResponse { marked_read }))
}

/// POST /api/v1/notification/generate-ai - AI-written spending insight,
/// stored and pushed like any other notification.
pub async fn generate_ai(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Notification>> {
    let insight = generate_insight(&state, &user, false).await?;
    Ok(Json(insight))
}

/// POST /api/v1/notification/generate-budget-insight - Same, focused on
/// per-category budget health.
pub async fn generate_budget_insight(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Notification>> {
    let insight = generate_insight(&state, &user, true).await?;
    Ok(Json(insight))
}

async fn generate_insight(
    state: &AppState,
    user: &User,
    budget_focused: bool,
) -> Result<Notification> {
    let ai = state.ai_client()?;

    let snapshot = snapshot::build_snapshot(&state.pool, user).await?;

    let (user_prompt, kind, title) = if budget_focused {
        (
            prompts::budget_insight_prompt(&snapshot),
            notification_kind::BUDGET_INSIGHT,
            "Budget insight",
        )
    } else {
        (
            prompts::spending_insight_prompt(&snapshot),
            notification_kind::AI_INSIGHT,
            "Spending insight",
        )
    };

    let message = ai
        .chat(
            prompts::INSIGHT_SYSTEM_PROMPT,
            &user_prompt,
            &ChatOptions::default(),
        )
        .await?;

    notify::dispatch(
        &state.pool,
        &state.hub,
        NewNotification {
            user_id: user.id,
            title: title.to_string(),
            message,
            kind: kind.to_string(),
            status: notification_status::COMPLETED.to_string(),
            category_id: None,
        },
    )
    .await
}

/// GET /api/v1/notification/ws?token=<JWT> - Real-time notification push.
///
/// The token is validated after the upgrade so a bad one gets a proper
/// policy-violation close frame instead of a failed handshake.
pub async fn websocket(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params.token))
}

#[derive(Debug, serde::Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

async fn authorize(state: &AppState, token: Option<String>) -> Option<User> {
    let token = token?;
    let user_id = jwt::decode_access_token(&state.settings.auth.secret_key, &token).ok()?;
    let user = db::users::get_user(&state.pool, user_id).await.ok()?;
    user.is_active.then_some(user)
}

async fn handle_socket(mut socket: WebSocket, state: AppState, token: Option<String>) {
    let user = match authorize(&state, token).await {
        Some(user) => user,
        None => {
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "invalid or missing token".into(),
                })))
                .await;
            return;
        }
    };

    debug!("WebSocket connected for user {}", user.id);

    let mut events = state.hub.subscribe(user.id);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };

                let payload = match serde_json::to_string(&event) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Failed to serialize notification event: {}", e);
                        continue;
                    }
                };

                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    // clients only listen on this channel; drop everything but close
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!("WebSocket disconnected for user {}", user.id);
}
