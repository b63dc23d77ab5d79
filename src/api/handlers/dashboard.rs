use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Duration, Months, NaiveDate, TimeZone, Timelike, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::api::handlers::AppState;
use crate::api::models::*;
use crate::auth::AuthUser;
use crate::budget::{
    self,
    period::{period_window, TimePeriod},
    round2,
};
use crate::db::{self, models::Transaction};
use crate::error::Result;

/// GET /api/v1/dashboard/summary - Aggregated data for every dashboard widget
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardSummary>> {
    let period = params.time_period;
    let now = Utc::now();
    let window = period_window(period, now);
    let multiplier = period.multiplier();

    let monthly_income = user.monthly_income.unwrap_or(0.0);
    let savings_goal = user.savings_goal_amount.unwrap_or(0.0);
    let allocated_budget = (monthly_income - savings_goal) * multiplier;

    let categories = db::categories::list_categories(&state.pool, user.id).await?;
    let all_transactions = db::transactions::list_transactions(&state.pool, user.id).await?;

    let period_transactions: Vec<&Transaction> = all_transactions
        .iter()
        .filter(|tx| tx.transaction_date >= window.start && tx.transaction_date < window.end)
        .collect();

    let total_spent: f64 = period_transactions.iter().map(|tx| tx.amount).sum();
    let remaining_budget = allocated_budget - total_spent;

    // Savings progress: monthly compares real savings to the raw goal,
    // other periods scale the goal onto the window
    let savings_progress_percentage = if savings_goal > 0.0 {
        if period == TimePeriod::Monthly {
            let actual_savings = (monthly_income - total_spent).max(0.0);
            (actual_savings / savings_goal * 100.0).min(100.0)
        } else {
            let actual_savings = (allocated_budget - total_spent).max(0.0);
            let period_goal = savings_goal * multiplier;
            if period_goal > 0.0 {
                (actual_savings / period_goal * 100.0).min(100.0)
            } else {
                0.0
            }
        }
    } else {
        0.0
    };

    let mut spent_per_category: HashMap<Uuid, f64> = HashMap::new();
    for tx in &period_transactions {
        if let Some(category_id) = tx.category_id {
            *spent_per_category.entry(category_id).or_default() += tx.amount;
        }
    }

    let mut category_health =
        budget::category_health(allocated_budget, &categories, &spent_per_category);
    category_health.sort_by(|a, b| b.spent.total_cmp(&a.spent));

    let top_spending_categories: Vec<_> = category_health.iter().take(5).cloned().collect();

    let category_allocation = category_health
        .iter()
        .map(|entry| AllocationPoint {
            name: entry.name.clone(),
            allocated: entry.allocated,
        })
        .collect();

    let spending_trends = spending_trends(period, &period_transactions, &all_transactions, now);

    // Last 7 days of spending, oldest first
    let mut daily_spending = Vec::with_capacity(7);
    for days_back in (0..7).rev() {
        let day = now.date_naive() - Duration::days(days_back);
        let amount: f64 = all_transactions
            .iter()
            .filter(|tx| tx.transaction_date.date_naive() == day)
            .map(|tx| tx.amount)
            .sum();
        daily_spending.push(TrendPoint {
            label: day.format("%b %d").to_string(),
            amount: round2(amount),
        });
    }

    let total_transactions = period_transactions.len();
    let avg_transaction_amount = if total_transactions > 0 {
        round2(total_spent / total_transactions as f64)
    } else {
        0.0
    };
    let categories_used = period_transactions
        .iter()
        .filter_map(|tx| tx.category_id)
        .collect::<HashSet<_>>()
        .len();

    Ok(Json(DashboardSummary {
        cards: DashboardCards {
            time_period: period,
            period_label: period.label().to_string(),
            income: round2(monthly_income * multiplier),
            spent: round2(total_spent),
            remaining: round2(remaining_budget),
            savings_progress: SavingsProgress {
                percentage: round2(savings_progress_percentage),
                saved_amount: round2((monthly_income * multiplier - total_spent).max(0.0)),
                goal_amount: round2(savings_goal * multiplier),
            },
        },
        spending_trends,
        category_allocation,
        daily_spending,
        top_spending_categories,
        quick_stats: QuickStats {
            total_transactions,
            avg_transaction_amount,
            categories_used,
        },
        category_health,
    }))
}

/// Bucketed spend for the period chart: hours of the day, days of the week,
/// weeks of the month, or months of the year.
fn spending_trends(
    period: TimePeriod,
    period_transactions: &[&Transaction],
    all_transactions: &[Transaction],
    now: chrono::DateTime<Utc>,
) -> Vec<TrendPoint> {
    let window = period_window(period, now);

    match period {
        TimePeriod::Daily => {
            let mut hourly = [0.0f64; 24];
            for tx in period_transactions {
                hourly[tx.transaction_date.hour() as usize] += tx.amount;
            }
            (0..24)
                .map(|hour| TrendPoint {
                    label: format!("{hour}:00"),
                    amount: round2(hourly[hour]),
                })
                .collect()
        }
        TimePeriod::Weekly => (0..7)
            .map(|offset| {
                let day = window.start.date_naive() + Duration::days(offset);
                let amount: f64 = period_transactions
                    .iter()
                    .filter(|tx| tx.transaction_date.date_naive() == day)
                    .map(|tx| tx.amount)
                    .sum();
                TrendPoint {
                    label: day.format("%a").to_string(),
                    amount: round2(amount),
                }
            })
            .collect(),
        TimePeriod::Monthly => (0..4)
            .map(|week| {
                let week_start = window.start + Duration::days(week * 7);
                let week_end = week_start + Duration::days(7);
                let amount: f64 = period_transactions
                    .iter()
                    .filter(|tx| {
                        tx.transaction_date >= week_start && tx.transaction_date < week_end
                    })
                    .map(|tx| tx.amount)
                    .sum();
                TrendPoint {
                    label: format!("Week {}", week + 1),
                    amount: round2(amount),
                }
            })
            .collect(),
        TimePeriod::Yearly => (1..=12u32)
            .map(|month| {
                let month_start = Utc.from_utc_datetime(
                    &NaiveDate::from_ymd_opt(now.year(), month, 1)
                        .expect("valid month start")
                        .and_hms_opt(0, 0, 0)
                        .expect("midnight is valid"),
                );
                let month_end = month_start
                    .checked_add_months(Months::new(1))
                    .expect("in-range date");
                let amount: f64 = all_transactions
                    .iter()
                    .filter(|tx| {
                        tx.transaction_date >= month_start && tx.transaction_date < month_end
                    })
                    .map(|tx| tx.amount)
                    .sum();
                TrendPoint {
                    label: month_start.format("%b").to_string(),
                    amount: round2(amount),
                }
            })
            .collect(),
    }
}
