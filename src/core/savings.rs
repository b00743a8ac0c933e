//! Savings projection.
//!
//! Estimates money saved by comparing the sessions a user would have had at their
//! original frequency with the sessions actually tracked since their plan started.
//! No rounding happens here; formatting is the caller's job.

use chrono::{DateTime, Utc};

/// Weekly spend assumed when none is recorded
pub const DEFAULT_WEEKLY_SPENDING: f64 = 20.0;
/// Daily sessions assumed when none is recorded
pub const DEFAULT_DAILY_FREQUENCY: u32 = 10;
/// Active days per week assumed when none is recorded
pub const DEFAULT_DAYS_PER_WEEK: u32 = 7;

/// Inputs to [`SavingsEstimator::estimate`]. Unset or non-positive baselines fall
/// back to the defaults above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsInputs {
    /// Weekly spending before cutting down
    pub weekly_spending: Option<f64>,
    /// Original sessions per active day
    pub daily_frequency: Option<u32>,
    /// Original active days per week
    pub days_per_week: Option<u32>,
    /// Cessation plan start, if any
    pub plan_start: Option<DateTime<Utc>>,
    /// Join date, used when there is no plan
    pub join_date: DateTime<Utc>,
    /// Current time
    pub now: DateTime<Utc>,
    /// Sessions tracked since the start date
    pub actual_event_count: usize,
}

/// Money saved so far and projected over a year. Both are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Savings {
    /// Saved since the start date
    pub current: f64,
    /// Projected yearly savings at the current reduction rate
    pub yearly: f64,
}

/// Stateless savings calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SavingsEstimator;

impl SavingsEstimator {
    /// Runs the projection.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Session counts are far below 2^52.
    pub fn estimate(inputs: &SavingsInputs) -> Savings {
        let weekly_spending = inputs
            .weekly_spending
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_WEEKLY_SPENDING);
        let frequency = inputs
            .daily_frequency
            .filter(|f| *f > 0)
            .unwrap_or(DEFAULT_DAILY_FREQUENCY);
        let days_per_week = inputs
            .days_per_week
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_DAYS_PER_WEEK);

        let start = inputs.plan_start.unwrap_or(inputs.join_date);
        let days_active = (inputs.now - start).num_days();
        let weeks_active = (days_active as f64 / 7.0).max(1.0);

        let sessions_per_week = f64::from(frequency) * f64::from(days_per_week);
        let expected_sessions = sessions_per_week * weeks_active;
        let cost_per_session = if sessions_per_week > 0.0 {
            weekly_spending / sessions_per_week
        } else {
            0.0
        };

        let actual_sessions = inputs.actual_event_count as f64;
        let expected_cost = expected_sessions * cost_per_session;
        let actual_cost = actual_sessions * cost_per_session;

        let reduction_rate = if expected_sessions > 0.0 {
            (expected_sessions - actual_sessions) / expected_sessions
        } else {
            0.0
        };

        Savings {
            current: (expected_cost - actual_cost).max(0.0),
            yearly: (weekly_spending * 52.0 * reduction_rate).max(0.0),
        }
    }
}
