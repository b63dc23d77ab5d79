//! Builds the JSON snapshot of a user's finances that gets embedded into
//! AI prompts (chatbot answers and generated insights).

use crate::budget::{
    self,
    period::{self, TimePeriod},
};
use crate::db::{self, models::User, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Collect profile, transactions, per-period goal progress and category
/// health into one JSON document.
pub async fn build_snapshot(pool: &DbPool, user: &User) -> Result<Value> {
    let now = Utc::now();
    let monthly_income = user.monthly_income.unwrap_or(0.0);
    let savings_goal = user.savings_goal_amount.unwrap_or(0.0);

    let categories = db::categories::list_categories(pool, user.id).await?;
    let transactions = db::transactions::list_transactions(pool, user.id).await?;

    let category_names: HashMap<Uuid, String> = categories
        .iter()
        .map(|c| (c.id, c.name.clone()))
        .collect();

    let transactions_json: Vec<Value> = transactions
        .iter()
        .map(|tx| {
            let category_name = tx
                .category_id
                .and_then(|id| category_names.get(&id).cloned())
                .unwrap_or_else(|| "Uncategorized".to_string());
            json!({
                "id": tx.id,
                "amount": tx.amount,
                "description": tx.description,
                "date": tx.transaction_date.to_rfc3339(),
                "category_name": category_name,
            })
        })
        .collect();

    // Goal progress across every reporting period
    let mut goal_progress = serde_json::Map::new();
    for (key, time_period) in [
        ("daily", TimePeriod::Daily),
        ("weekly", TimePeriod::Weekly),
        ("monthly", TimePeriod::Monthly),
        ("yearly", TimePeriod::Yearly),
    ] {
        let window = period::period_window(time_period, now);
        let spent: f64 = transactions
            .iter()
            .filter(|tx| tx.transaction_date >= window.start && tx.transaction_date < window.end)
            .map(|tx| tx.amount)
            .sum();
        let progress =
            period::goal_progress(time_period, monthly_income, savings_goal, spent, now);
        let progress = serde_json::to_value(&progress)
            .map_err(|e| Error::Internal(format!("Snapshot serialization failed: {e}")))?;
        goal_progress.insert(key.to_string(), progress);
    }

    // Category health over the current month
    let window = period::period_window(TimePeriod::Monthly, now);
    let mut spent_per_category: HashMap<Uuid, f64> = HashMap::new();
    let mut monthly_spent = 0.0;
    for tx in &transactions {
        if tx.transaction_date >= window.start && tx.transaction_date < window.end {
            monthly_spent += tx.amount;
            if let Some(category_id) = tx.category_id {
                *spent_per_category.entry(category_id).or_default() += tx.amount;
            }
        }
    }

    let allocated_budget = monthly_income - savings_goal;
    let expense_overview =
        budget::category_health(allocated_budget, &categories, &spent_per_category);

    Ok(json!({
        "user_info": {
            "id": user.id,
            "email": user.email,
            "full_name": user.full_name.clone().unwrap_or_default(),
            "monthly_income": monthly_income,
            "savings_goal_amount": savings_goal,
        },
        "transactions": transactions_json,
        "goal_progress": Value::Object(goal_progress),
        "expense_overview": expense_overview,
        "dashboard_summary": {
            "income": budget::round2(monthly_income),
            "spent": budget::round2(monthly_spent),
            "remaining": budget::round2(allocated_budget - monthly_spent),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewCategory, NewTransaction, NewUser, UpdateUser};
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_snapshot_shape() {
        let pool = test_pool().await;

        let user = db::users::create_user(
            &pool,
            &NewUser {
                email: "snap@example.com".to_string(),
                hashed_password: "hash".to_string(),
                full_name: Some("Snap".to_string()),
                is_superuser: false,
                is_verified: false,
                google_id: None,
            },
        )
        .await
        .unwrap();

        let user = db::users::update_user(
            &pool,
            user.id,
            &UpdateUser {
                monthly_income: Some(10000.0),
                savings_goal_amount: Some(2000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let category = db::categories::create_category(
            &pool,
            user.id,
            &NewCategory {
                name: "Food".to_string(),
                description: None,
                default_percentage: 100.0,
                custom_percentage: None,
                is_default: false,
                is_fixed: false,
            },
        )
        .await
        .unwrap();

        db::transactions::create_transaction(
            &pool,
            user.id,
            &NewTransaction {
                description: "Lunch".to_string(),
                amount: 350.0,
                category_id: Some(category.id),
                transaction_date: Utc::now(),
            },
        )
        .await
        .unwrap();

        let snapshot = build_snapshot(&pool, &user).await.unwrap();

        assert_eq!(snapshot["user_info"]["monthly_income"], 10000.0);
        assert_eq!(snapshot["transactions"][0]["category_name"], "Food");
        assert!(snapshot["goal_progress"]["monthly"]["status"].is_string());
        assert_eq!(snapshot["expense_overview"][0]["spent"], 350.0);
        assert_eq!(snapshot["dashboard_summary"]["spent"], 350.0);
    }
}
