use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    entities::subscription_periods::SubscriptionPeriodEntity,
    value_objects::enums::period_statuses::PeriodStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusProjection {
    pub status: PeriodStatus,
    pub days_left: Option<i64>,
}

/// Derives the visible status of a period as of `today`.
///
/// Precedence is canceled, then paused, then expired, then active. A paused
/// period past its end date still reports `paused`: pausing stops the clock,
/// so the end date is not yet final.
pub fn project(period: &SubscriptionPeriodEntity, today: NaiveDate) -> StatusProjection {
    let status = if period.cancelled_at.is_some() {
        PeriodStatus::Canceled
    } else if period.paused_at.is_some() {
        PeriodStatus::Paused
    } else if period.end_date < today {
        PeriodStatus::Expired
    } else {
        PeriodStatus::Active
    };

    let days_left = match status {
        PeriodStatus::Canceled | PeriodStatus::Expired => None,
        PeriodStatus::Paused | PeriodStatus::Active => {
            Some((period.end_date - today).num_days().max(0))
        }
    };

    StatusProjection { status, days_left }
}
