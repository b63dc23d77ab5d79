use crate::budget::{period::TimePeriod, CategoryHealth};
use crate::db::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Public view of a user account
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub monthly_income: Option<f64>,
    pub savings_goal_amount: Option<f64>,
    pub savings_goal_deadline: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            monthly_income: user.monthly_income,
            savings_goal_amount: user.savings_goal_amount,
            savings_goal_deadline: user.savings_goal_deadline,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyTokenResponse {
    pub authenticated: bool,
    pub user_id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleLoginRequest {
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginResponse {
    pub authorization_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationListParams {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Clone, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkAllReadResponse {
    pub marked_read: u64,
}

// ---------------------------------------------------------------------------
// Transactions import
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardParams {
    #[serde(default)]
    pub time_period: TimePeriod,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsProgress {
    pub percentage: f64,
    pub saved_amount: f64,
    pub goal_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCards {
    pub time_period: TimePeriod,
    pub period_label: String,
    pub income: f64,
    pub spent: f64,
    pub remaining: f64,
    pub savings_progress: SavingsProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationPoint {
    pub name: String,
    pub allocated: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickStats {
    pub total_transactions: usize,
    pub avg_transaction_amount: f64,
    pub categories_used: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub cards: DashboardCards,
    pub spending_trends: Vec<TrendPoint>,
    pub category_allocation: Vec<AllocationPoint>,
    pub daily_spending: Vec<TrendPoint>,
    pub top_spending_categories: Vec<CategoryHealth>,
    pub quick_stats: QuickStats,
    pub category_health: Vec<CategoryHealth>,
}

// ---------------------------------------------------------------------------
// Chatbot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChatbotRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatbotResponse {
    pub response: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCommandRequest {
    pub command: String,
    #[serde(default)]
    pub dry_run: bool,
}

/// One planned action from the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCommandAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCommandPlan {
    pub actions: Vec<ChatCommandAction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutedActionResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCommandResponse {
    pub plan: ChatCommandPlan,
    pub executed: Vec<ExecutedActionResult>,
    pub response: String,
}
