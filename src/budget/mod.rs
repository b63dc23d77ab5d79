//! Budget arithmetic: recurring-expense totals, income allocation across
//! categories, daily budgets and overspend rebalancing. Pure functions so the
//! dashboard, scheduler and insight generation all share one implementation.

pub mod period;

use crate::db::models::{Category, Expense, Frequency};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Share of post-recurring income set aside for savings when allocating
const DEFAULT_SAVINGS_RATE: f64 = 0.2;

/// Spend ratio at which a category counts as "Near Limit"
const NEAR_LIMIT_RATIO: f64 = 0.9;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).expect("day 1 always valid");
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .expect("in-range date")
}

fn days_in_month(date: NaiveDate) -> i64 {
    let first = date.with_day(1).expect("day 1 always valid");
    (last_day_of_month(date) - first).num_days() + 1
}

/// Sum of recurring expenses projected over the month containing `as_of`.
///
/// monthly: once; weekly: 4.25 occurrences; daily: remaining days in the
/// month (inclusive of today); custom: whole occurrences of `interval_days`
/// in the month. One-time and inactive expenses are excluded.
pub fn monthly_recurring_total(expenses: &[Expense], as_of: NaiveDate) -> f64 {
    let last_day = last_day_of_month(as_of);

    let mut total = 0.0;
    for expense in expenses {
        if !expense.is_active || expense.frequency == Frequency::OneTime {
            continue;
        }

        match expense.frequency {
            Frequency::Monthly => total += expense.amount,
            Frequency::Weekly => total += expense.amount * 4.25,
            Frequency::Daily => {
                let days_remaining = (last_day - as_of).num_days() + 1;
                total += expense.amount * days_remaining as f64;
            }
            Frequency::Custom => {
                if let Some(interval) = expense.interval_days {
                    if interval > 0 {
                        let occurrences = days_in_month(as_of) / interval;
                        total += expense.amount * occurrences as f64;
                    }
                }
            }
            Frequency::OneTime => unreachable!("filtered above"),
        }
    }

    total
}

/// Allocation percentage for a category: the user override wins
pub fn category_percentage(category: &Category) -> f64 {
    category.custom_percentage.unwrap_or(category.default_percentage)
}

/// Distribute a month's income across categories.
///
/// Recurring expenses come off the top, then a savings slice
/// (`DEFAULT_SAVINGS_RATE` of what remains), then the rest is split by
/// category percentages. If every percentage is zero, the split is equal.
pub fn allocate_budget(
    monthly_income: f64,
    categories: &[Category],
    expenses: &[Expense],
    as_of: NaiveDate,
) -> HashMap<String, f64> {
    let mut allocation = HashMap::new();
    if categories.is_empty() {
        return allocation;
    }

    let recurring = monthly_recurring_total(expenses, as_of);
    let target_savings = DEFAULT_SAVINGS_RATE * (monthly_income - recurring);
    let net_after_fixed = monthly_income - recurring - target_savings;

    let total_percent: f64 = categories.iter().map(category_percentage).sum();

    if total_percent == 0.0 {
        let equal_share = net_after_fixed / categories.len() as f64;
        for category in categories {
            allocation.insert(category.name.clone(), round2(equal_share));
        }
    } else {
        for category in categories {
            let share = category_percentage(category) / total_percent * net_after_fixed;
            allocation.insert(category.name.clone(), round2(share));
        }
    }

    allocation
}

/// What the user can spend per day this month after recurring bills
pub fn daily_budget(monthly_income: f64, expenses: &[Expense], as_of: NaiveDate) -> f64 {
    let days = days_in_month(as_of);
    if days <= 0 {
        return 0.0;
    }

    let recurring = monthly_recurring_total(expenses, as_of);
    round2((monthly_income - recurring) / days as f64)
}

/// After an overspend in one category, pull the excess out of the others
/// proportionally to their current allocation, never below zero.
pub fn rebalance_if_overspent(
    category_name: &str,
    overspend_amount: f64,
    mut allocation: HashMap<String, f64>,
) -> HashMap<String, f64> {
    if overspend_amount <= 0.0 || !allocation.contains_key(category_name) {
        return allocation;
    }

    if let Some(amount) = allocation.get_mut(category_name) {
        *amount = (*amount - overspend_amount).max(0.0);
    }

    let rest: Vec<String> = allocation
        .keys()
        .filter(|name| name.as_str() != category_name)
        .cloned()
        .collect();
    if rest.is_empty() {
        return allocation;
    }

    let sum_rest: f64 = rest.iter().filter_map(|name| allocation.get(name)).sum();
    if sum_rest <= 0.0 {
        return allocation;
    }

    for name in rest {
        if let Some(amount) = allocation.get_mut(&name) {
            let proportion = *amount / sum_rest;
            *amount = round2((*amount - overspend_amount * proportion).max(0.0));
        }
    }

    allocation
}

/// Budget health of one category over a period
#[derive(Debug, Clone, Serialize)]
pub struct CategoryHealth {
    pub id: Uuid,
    pub name: String,
    pub allocated: f64,
    pub spent: f64,
    pub remaining: f64,
    pub status: String,
    pub progress_percentage: f64,
}

pub mod health_status {
    pub const GOOD: &str = "Good";
    pub const NEAR_LIMIT: &str = "Near Limit";
    pub const OVER_BUDGET: &str = "Over Budget";
}

/// Rate each category's spend against its share of `allocated_budget`.
/// `spent_per_category` maps category id to spend for the period.
pub fn category_health(
    allocated_budget: f64,
    categories: &[Category],
    spent_per_category: &HashMap<Uuid, f64>,
) -> Vec<CategoryHealth> {
    let mut health = Vec::with_capacity(categories.len());

    for category in categories {
        let allocated = allocated_budget * (category_percentage(category) / 100.0);
        let spent = spent_per_category.get(&category.id).copied().unwrap_or(0.0);

        let status = if spent > allocated {
            health_status::OVER_BUDGET
        } else if allocated > 0.0 && spent >= allocated * NEAR_LIMIT_RATIO {
            health_status::NEAR_LIMIT
        } else {
            health_status::GOOD
        };

        let progress = if allocated > 0.0 {
            (spent / allocated * 100.0).min(100.0)
        } else {
            0.0
        };

        health.push(CategoryHealth {
            id: category.id,
            name: category.name.clone(),
            allocated: round2(allocated),
            spent: round2(spent),
            remaining: round2(allocated - spent),
            status: status.to_string(),
            progress_percentage: round2(progress),
        });
    }

    health
}

/// Next occurrence of a recurring expense, or None for a spent one-time bill
pub fn next_occurrence(
    frequency: Frequency,
    from: DateTime<Utc>,
    interval_days: Option<i64>,
) -> Option<DateTime<Utc>> {
    match frequency {
        Frequency::OneTime => None,
        Frequency::Daily => from.checked_add_days(Days::new(1)),
        Frequency::Weekly => from.checked_add_days(Days::new(7)),
        Frequency::Monthly => from.checked_add_months(Months::new(1)),
        Frequency::Custom => {
            let interval = interval_days.filter(|days| *days > 0)?;
            from.checked_add_days(Days::new(interval as u64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn category(name: &str, default_pct: f64, custom_pct: Option<f64>) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            default_percentage: default_pct,
            custom_percentage: custom_pct,
            is_default: false,
            is_fixed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn expense(amount: f64, frequency: Frequency, interval_days: Option<i64>) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "bill".to_string(),
            amount,
            category_id: None,
            frequency,
            interval_days,
            next_due_date: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_monthly_recurring_total() {
        // June 2025 has 30 days; as_of the 16th leaves 15 days inclusive
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();

        let expenses = vec![
            expense(1000.0, Frequency::Monthly, None),
            expense(100.0, Frequency::Weekly, None),
            expense(10.0, Frequency::Daily, None),
            expense(50.0, Frequency::Custom, Some(10)), // 3 occurrences in 30 days
            expense(9999.0, Frequency::OneTime, None),  // never counted
        ];

        let total = monthly_recurring_total(&expenses, as_of);
        assert_eq!(total, 1000.0 + 100.0 * 4.25 + 10.0 * 15.0 + 50.0 * 3.0);
    }

    #[test]
    fn test_inactive_expense_excluded() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut paused = expense(1000.0, Frequency::Monthly, None);
        paused.is_active = false;

        assert_eq!(monthly_recurring_total(&[paused], as_of), 0.0);
    }

    #[test]
    fn test_allocate_budget_by_percentages() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let categories = vec![
            category("Essentials", 50.0, None),
            category("Wants", 30.0, None),
            category("Savings", 20.0, None),
        ];

        // income 10000, no recurring: savings slice 2000, 8000 to split
        let allocation = allocate_budget(10000.0, &categories, &[], as_of);
        assert_eq!(allocation["Essentials"], 4000.0);
        assert_eq!(allocation["Wants"], 2400.0);
        assert_eq!(allocation["Savings"], 1600.0);
    }

    #[test]
    fn test_allocate_budget_custom_percentage_wins() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let categories = vec![
            category("A", 50.0, Some(100.0)),
            category("B", 50.0, Some(0.0)),
        ];

        let allocation = allocate_budget(10000.0, &categories, &[], as_of);
        assert_eq!(allocation["A"], 8000.0);
        assert_eq!(allocation["B"], 0.0);
    }

    #[test]
    fn test_allocate_budget_equal_split_fallback() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let categories = vec![category("A", 0.0, None), category("B", 0.0, None)];

        let allocation = allocate_budget(10000.0, &categories, &[], as_of);
        assert_eq!(allocation["A"], 4000.0);
        assert_eq!(allocation["B"], 4000.0);
    }

    #[test]
    fn test_daily_budget() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(); // 30-day month
        let expenses = vec![expense(3000.0, Frequency::Monthly, None)];

        assert_eq!(daily_budget(12000.0, &expenses, as_of), 300.0);
    }

    #[test]
    fn test_rebalance_if_overspent() {
        let mut allocation = HashMap::new();
        allocation.insert("Food".to_string(), 1000.0);
        allocation.insert("Fun".to_string(), 600.0);
        allocation.insert("Travel".to_string(), 400.0);

        let rebalanced = rebalance_if_overspent("Food", 500.0, allocation);

        assert_eq!(rebalanced["Food"], 500.0);
        // 500 pulled from Fun and Travel in a 600:400 ratio
        assert_eq!(rebalanced["Fun"], 300.0);
        assert_eq!(rebalanced["Travel"], 200.0);
    }

    #[test]
    fn test_rebalance_unknown_category_is_noop() {
        let mut allocation = HashMap::new();
        allocation.insert("Food".to_string(), 1000.0);

        let rebalanced = rebalance_if_overspent("Missing", 500.0, allocation.clone());
        assert_eq!(rebalanced, allocation);
    }

    #[test]
    fn test_category_health_statuses() {
        let good = category("Good", 50.0, None);
        let near = category("Near", 30.0, None);
        let over = category("Over", 20.0, None);

        let mut spent = HashMap::new();
        spent.insert(good.id, 100.0); // of 5000
        spent.insert(near.id, 2850.0); // of 3000 -> 95%
        spent.insert(over.id, 2500.0); // of 2000

        let health = category_health(10000.0, &[good, near, over], &spent);

        assert_eq!(health[0].status, health_status::GOOD);
        assert_eq!(health[1].status, health_status::NEAR_LIMIT);
        assert_eq!(health[2].status, health_status::OVER_BUDGET);
        assert_eq!(health[2].progress_percentage, 100.0);
        assert_eq!(health[2].remaining, -500.0);
    }

    #[test]
    fn test_next_occurrence() {
        let from = Utc.with_ymd_and_hms(2025, 1, 31, 9, 0, 0).unwrap();

        assert_eq!(
            next_occurrence(Frequency::Daily, from, None).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap()
        );
        // month arithmetic clamps to the end of February
        assert_eq!(
            next_occurrence(Frequency::Monthly, from, None).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 28, 9, 0, 0).unwrap()
        );
        assert_eq!(
            next_occurrence(Frequency::Custom, from, Some(10)).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap()
        );
        assert!(next_occurrence(Frequency::OneTime, from, None).is_none());
        assert!(next_occurrence(Frequency::Custom, from, None).is_none());
    }
}
