//! Reporting periods: window boundaries and the income multiplier used to
//! scale monthly figures onto a period.

use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Default for TimePeriod {
    fn default() -> Self {
        TimePeriod::Monthly
    }
}

impl TimePeriod {
    pub fn label(&self) -> &'static str {
        match self {
            TimePeriod::Daily => "Daily",
            TimePeriod::Weekly => "Weekly",
            TimePeriod::Monthly => "Monthly",
            TimePeriod::Yearly => "Yearly",
        }
    }

    /// Factor converting a monthly amount onto this period
    pub fn multiplier(&self) -> f64 {
        match self {
            TimePeriod::Daily => 1.0 / 30.0,
            TimePeriod::Weekly => 1.0 / 4.33,
            TimePeriod::Monthly => 1.0,
            TimePeriod::Yearly => 12.0,
        }
    }
}

/// Half-open [start, end) window for a reporting period
#[derive(Debug, Clone, Copy)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The window containing `now` for a period. Weeks start on Monday; months
/// and years are calendar-aligned.
pub fn period_window(period: TimePeriod, now: DateTime<Utc>) -> PeriodWindow {
    let midnight = |date: chrono::NaiveDate| {
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
    };

    let today = now.date_naive();

    let (start, end) = match period {
        TimePeriod::Daily => {
            let start = midnight(today);
            (start, start + Duration::days(1))
        }
        TimePeriod::Weekly => {
            let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            let start = midnight(monday);
            (start, start + Duration::days(7))
        }
        TimePeriod::Monthly => {
            let first = today.with_day(1).expect("day 1 always valid");
            let start = midnight(first);
            let end = midnight(
                first
                    .checked_add_months(Months::new(1))
                    .expect("in-range date"),
            );
            (start, end)
        }
        TimePeriod::Yearly => {
            let jan1 = today.with_day(1).and_then(|d| d.with_month(1)).expect("jan 1 valid");
            let start = midnight(jan1);
            let end = midnight(
                jan1.checked_add_months(Months::new(12)).expect("in-range date"),
            );
            (start, end)
        }
    };

    PeriodWindow { start, end }
}

/// Savings-goal progress over one period
#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub target_amount: f64,
    pub saved_amount: f64,
    pub progress_percentage: f64,
    pub status: String,
    pub period_end_date: DateTime<Utc>,
    pub percentage_of_income: f64,
    pub remaining_amount: f64,
}

pub mod goal_status {
    pub const ACHIEVED: &str = "Goal Achieved";
    pub const ON_TRACK: &str = "On Track";
    pub const IN_PROGRESS: &str = "In Progress";
    pub const BEHIND: &str = "Behind Target";
}

/// Rate savings progress for a period: what is left of the period income
/// after spending counts toward the scaled savings goal.
pub fn goal_progress(
    period: TimePeriod,
    monthly_income: f64,
    savings_goal_amount: f64,
    spent_in_period: f64,
    now: DateTime<Utc>,
) -> GoalProgress {
    let window = period_window(period, now);
    let multiplier = period.multiplier();

    let target = round2(savings_goal_amount * multiplier);
    let period_income = monthly_income * multiplier;
    let saved = round2((period_income - spent_in_period).max(0.0));

    let progress = if target > 0.0 {
        (saved / target * 100.0).min(100.0)
    } else {
        0.0
    };

    let status = if target <= 0.0 {
        goal_status::IN_PROGRESS
    } else if progress >= 100.0 {
        goal_status::ACHIEVED
    } else if progress >= 60.0 {
        goal_status::ON_TRACK
    } else if progress >= 25.0 {
        goal_status::IN_PROGRESS
    } else {
        goal_status::BEHIND
    };

    let percentage_of_income = if period_income > 0.0 {
        round2((target / period_income * 100.0).min(100.0))
    } else {
        0.0
    };

    GoalProgress {
        target_amount: target,
        saved_amount: saved,
        progress_percentage: round2(progress),
        status: status.to_string(),
        period_end_date: window.end,
        percentage_of_income,
        remaining_amount: round2((target - saved).max(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_windows() {
        // Wednesday 2025-06-18
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 15, 30, 0).unwrap();

        let daily = period_window(TimePeriod::Daily, now);
        assert_eq!(daily.start, Utc.with_ymd_and_hms(2025, 6, 18, 0, 0, 0).unwrap());
        assert_eq!(daily.end - daily.start, Duration::days(1));

        let weekly = period_window(TimePeriod::Weekly, now);
        assert_eq!(weekly.start, Utc.with_ymd_and_hms(2025, 6, 16, 0, 0, 0).unwrap());
        assert_eq!(weekly.end - weekly.start, Duration::days(7));

        let monthly = period_window(TimePeriod::Monthly, now);
        assert_eq!(monthly.start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(monthly.end, Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());

        let yearly = period_window(TimePeriod::Yearly, now);
        assert_eq!(yearly.start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(yearly.end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_goal_progress_statuses() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();

        // income 10000, goal 2000, nothing spent: saved 10000 >= goal
        let achieved = goal_progress(TimePeriod::Monthly, 10000.0, 2000.0, 0.0, now);
        assert_eq!(achieved.status, goal_status::ACHIEVED);
        assert_eq!(achieved.progress_percentage, 100.0);
        assert_eq!(achieved.remaining_amount, 0.0);

        // spent so much that nothing is left to save
        let behind = goal_progress(TimePeriod::Monthly, 10000.0, 2000.0, 10000.0, now);
        assert_eq!(behind.status, goal_status::BEHIND);
        assert_eq!(behind.saved_amount, 0.0);
        assert_eq!(behind.remaining_amount, 2000.0);

        // partial savings land in the middle bands
        let partial = goal_progress(TimePeriod::Monthly, 10000.0, 2000.0, 9000.0, now);
        assert_eq!(partial.status, goal_status::IN_PROGRESS);
    }

    #[test]
    fn test_goal_progress_scales_with_period() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();

        let yearly = goal_progress(TimePeriod::Yearly, 10000.0, 2000.0, 0.0, now);
        assert_eq!(yearly.target_amount, 24000.0);
    }
}
