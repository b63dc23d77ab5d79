use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub full_name: Option<String>,
    pub monthly_income: Option<f64>,
    pub savings_goal_amount: Option<f64>,
    pub savings_goal_deadline: Option<DateTime<Utc>>,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub google_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub monthly_income: Option<f64>,
    pub savings_goal_amount: Option<f64>,
    pub savings_goal_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub default_percentage: f64,
    pub custom_percentage: Option<f64>,
    pub is_default: bool,
    pub is_fixed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub default_percentage: f64,
    pub custom_percentage: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_fixed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub default_percentage: Option<f64>,
    pub custom_percentage: Option<f64>,
    pub is_fixed: Option<bool>,
}

/// How often a recurring expense repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Frequency {
    OneTime,
    Daily,
    Weekly,
    Monthly,
    /// Every `interval_days` days
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub category_id: Option<Uuid>,
    pub frequency: Frequency,
    pub interval_days: Option<i64>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub name: String,
    pub amount: f64,
    pub category_id: Option<Uuid>,
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    pub interval_days: Option<i64>,
    pub next_due_date: Option<DateTime<Utc>>,
}

fn default_frequency() -> Frequency {
    Frequency::OneTime
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExpense {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub category_id: Option<Uuid>,
    pub frequency: Option<Frequency>,
    pub interval_days: Option<i64>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub category_id: Option<Uuid>,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub category_id: Option<Uuid>,
    pub transaction_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTransaction {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category_id: Option<Uuid>,
    pub transaction_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_amount: f64,
    pub deadline: DateTime<Utc>,
    pub saved_amount: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
    pub target_amount: f64,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGoal {
    pub target_amount: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub saved_amount: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub status: String,
    pub category_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub status: String,
    pub category_id: Option<Uuid>,
}

/// Notification status values used throughout the service
pub mod notification_status {
    pub const COMPLETED: &str = "completed";
    pub const ALERT: &str = "alert";
}

/// Notification kinds emitted by the service
pub mod notification_kind {
    pub const BILL_DUE: &str = "bill_due";
    pub const OVERSPEND: &str = "overspend";
    pub const AI_INSIGHT: &str = "ai_insight";
    pub const BUDGET_INSIGHT: &str = "budget_insight";
}
