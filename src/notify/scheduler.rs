//! Background worker: advances recurring bills and raises overspend alerts.

use crate::budget::{self, period::TimePeriod};
use crate::db::{
    self,
    models::{notification_kind, notification_status, Expense, NewNotification},
    DbPool,
};
use crate::error::Result;
use crate::notify::{self, NotificationHub};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Periodic notification producer
pub struct Scheduler {
    pool: DbPool,
    hub: Arc<NotificationHub>,
    interval_seconds: u64,
}

impl Scheduler {
    pub fn new(pool: DbPool, hub: Arc<NotificationHub>, interval_seconds: u64) -> Self {
        Self {
            pool,
            hub,
            interval_seconds,
        }
    }

    /// Start the scheduler in the background
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Notification scheduler started with interval: {}s",
                self.interval_seconds
            );

            let mut ticker = interval(Duration::from_secs(self.interval_seconds));

            loop {
                ticker.tick().await;

                debug!("Scheduler tick: checking due bills and budget health");

                if let Err(e) = self.process_due_expenses().await {
                    error!("Error processing due expenses: {}", e.log_safe());
                }

                if let Err(e) = self.process_overspending().await {
                    error!("Error processing overspend checks: {}", e.log_safe());
                }
            }
        })
    }

    /// Emit a bill-due alert for every recurring expense whose due date has
    /// passed, then advance it to its next occurrence.
    pub async fn process_due_expenses(&self) -> Result<usize> {
        let now = Utc::now();
        let due = db::expenses::list_due_expenses(&self.pool, now).await?;
        let mut notified = 0;

        for expense in due {
            match self.notify_due_expense(&expense).await {
                Ok(()) => notified += 1,
                Err(e) => warn!(
                    "Failed to raise due-bill notification for expense {}: {}",
                    expense.id,
                    e.log_safe()
                ),
            }
        }

        if notified > 0 {
            info!("Raised {} due-bill notifications", notified);
        }

        Ok(notified)
    }

    async fn notify_due_expense(&self, expense: &Expense) -> Result<()> {
        notify::dispatch(
            &self.pool,
            &self.hub,
            NewNotification {
                user_id: expense.user_id,
                title: format!("Bill due: {}", expense.name),
                message: format!(
                    "Your recurring expense \"{}\" of \u{20b9}{:.2} is due.",
                    expense.name, expense.amount
                ),
                kind: notification_kind::BILL_DUE.to_string(),
                status: notification_status::ALERT.to_string(),
                category_id: expense.category_id,
            },
        )
        .await?;

        let due_from = expense.next_due_date.unwrap_or_else(Utc::now);
        let next = budget::next_occurrence(expense.frequency, due_from, expense.interval_days);
        db::expenses::advance_due_date(&self.pool, expense.id, next).await?;

        Ok(())
    }

    /// Raise one overspend alert per over-budget category, skipping
    /// categories that already carry an unread alert.
    pub async fn process_overspending(&self) -> Result<usize> {
        let user_ids = db::users::list_user_ids_with_income(&self.pool).await?;
        let mut notified = 0;

        for user_id in user_ids {
            match self.check_user_budgets(user_id).await {
                Ok(count) => notified += count,
                Err(e) => warn!(
                    "Overspend check failed for user {}: {}",
                    user_id,
                    e.log_safe()
                ),
            }
        }

        if notified > 0 {
            info!("Raised {} overspend notifications", notified);
        }

        Ok(notified)
    }

    async fn check_user_budgets(&self, user_id: Uuid) -> Result<usize> {
        let user = db::users::get_user(&self.pool, user_id).await?;
        let monthly_income = match user.monthly_income {
            Some(income) if income > 0.0 => income,
            _ => return Ok(0),
        };

        let categories = db::categories::list_categories(&self.pool, user_id).await?;
        if categories.is_empty() {
            return Ok(0);
        }

        let window = budget::period::period_window(TimePeriod::Monthly, Utc::now());
        let transactions = db::transactions::list_transactions_in_range(
            &self.pool,
            user_id,
            window.start,
            window.end,
        )
        .await?;

        let mut spent_per_category: HashMap<Uuid, f64> = HashMap::new();
        for tx in &transactions {
            if let Some(category_id) = tx.category_id {
                *spent_per_category.entry(category_id).or_default() += tx.amount;
            }
        }

        let allocated_budget = monthly_income - user.savings_goal_amount.unwrap_or(0.0);
        let health = budget::category_health(allocated_budget, &categories, &spent_per_category);

        let mut notified = 0;
        for entry in health {
            if entry.status != budget::health_status::OVER_BUDGET {
                continue;
            }

            // one open alert per category at a time
            if db::notifications::has_unread_for_category(
                &self.pool,
                user_id,
                notification_kind::OVERSPEND,
                entry.id,
            )
            .await?
            {
                continue;
            }

            let overspent = entry.spent - entry.allocated;
            notify::dispatch(
                &self.pool,
                &self.hub,
                NewNotification {
                    user_id,
                    title: format!("Over budget in {}", entry.name),
                    message: format!(
                        "You have spent \u{20b9}{:.2} of your \u{20b9}{:.2} {} budget this month (\u{20b9}{:.2} over).",
                        entry.spent, entry.allocated, entry.name, overspent
                    ),
                    kind: notification_kind::OVERSPEND.to_string(),
                    status: notification_status::ALERT.to_string(),
                    category_id: Some(entry.id),
                },
            )
            .await?;
            notified += 1;
        }

        Ok(notified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Frequency, NewCategory, NewExpense, NewTransaction, NewUser, UpdateUser};
    use crate::db::test_pool;
    use chrono::Duration as ChronoDuration;

    async fn seed_user(pool: &DbPool, email: &str, income: Option<f64>) -> Uuid {
        let user = db::users::create_user(
            pool,
            &NewUser {
                email: email.to_string(),
                hashed_password: "hash".to_string(),
                full_name: None,
                is_superuser: false,
                is_verified: false,
                google_id: None,
            },
        )
        .await
        .unwrap();

        if income.is_some() {
            db::users::update_user(
                pool,
                user.id,
                &UpdateUser {
                    monthly_income: income,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        user.id
    }

    #[tokio::test]
    async fn test_due_expense_produces_notification_and_advances() {
        let pool = test_pool().await;
        let hub = Arc::new(NotificationHub::new());
        let user_id = seed_user(&pool, "sched@example.com", None).await;

        let expense = db::expenses::create_expense(
            &pool,
            user_id,
            &NewExpense {
                name: "Rent".to_string(),
                amount: 15000.0,
                category_id: None,
                frequency: Frequency::Monthly,
                interval_days: None,
                next_due_date: Some(Utc::now() - ChronoDuration::hours(1)),
            },
        )
        .await
        .unwrap();

        let scheduler = Scheduler::new(pool.clone(), hub.clone(), 3600);
        let notified = scheduler.process_due_expenses().await.unwrap();
        assert_eq!(notified, 1);

        let notifications = db::notifications::list_notifications(
            &pool,
            user_id,
            &Default::default(),
            50,
            0,
        )
        .await
        .unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, notification_kind::BILL_DUE);

        // due date moved about a month ahead, so the next tick is quiet
        let advanced = db::expenses::get_expense(&pool, user_id, expense.id).await.unwrap();
        assert!(advanced.next_due_date.unwrap() > Utc::now());

        let notified = scheduler.process_due_expenses().await.unwrap();
        assert_eq!(notified, 0);
    }

    #[tokio::test]
    async fn test_one_time_expense_is_deactivated() {
        let pool = test_pool().await;
        let hub = Arc::new(NotificationHub::new());
        let user_id = seed_user(&pool, "onetime@example.com", None).await;

        let expense = db::expenses::create_expense(
            &pool,
            user_id,
            &NewExpense {
                name: "Deposit".to_string(),
                amount: 5000.0,
                category_id: None,
                frequency: Frequency::OneTime,
                interval_days: None,
                next_due_date: Some(Utc::now() - ChronoDuration::hours(1)),
            },
        )
        .await
        .unwrap();

        let scheduler = Scheduler::new(pool.clone(), hub, 3600);
        scheduler.process_due_expenses().await.unwrap();

        let settled = db::expenses::get_expense(&pool, user_id, expense.id).await.unwrap();
        assert!(!settled.is_active);
        assert!(settled.next_due_date.is_none());
    }

    #[tokio::test]
    async fn test_overspend_alert_raised_once() {
        let pool = test_pool().await;
        let hub = Arc::new(NotificationHub::new());
        let user_id = seed_user(&pool, "over@example.com", Some(10000.0)).await;

        let category = db::categories::create_category(
            &pool,
            user_id,
            &NewCategory {
                name: "Dining".to_string(),
                description: None,
                default_percentage: 10.0,
                custom_percentage: None,
                is_default: false,
                is_fixed: false,
            },
        )
        .await
        .unwrap();

        // 10% of 10000 allocates 1000; spend well past it
        db::transactions::create_transaction(
            &pool,
            user_id,
            &NewTransaction {
                description: "Feast".to_string(),
                amount: 2500.0,
                category_id: Some(category.id),
                transaction_date: Utc::now(),
            },
        )
        .await
        .unwrap();

        let scheduler = Scheduler::new(pool.clone(), hub, 3600);

        let first = scheduler.process_overspending().await.unwrap();
        assert_eq!(first, 1);

        // unread alert already present, so no duplicate
        let second = scheduler.process_overspending().await.unwrap();
        assert_eq!(second, 0);

        // once read, a still-over-budget category alerts again
        db::notifications::mark_all_read(&pool, user_id).await.unwrap();
        let third = scheduler.process_overspending().await.unwrap();
        assert_eq!(third, 1);
    }
}
