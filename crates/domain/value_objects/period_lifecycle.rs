//! Transition rules for a single subscription period.
//!
//! Everything here is pure: the repository reads the locked rows inside its
//! transaction, asks these functions what the new state is (or why the change
//! is refused), and only then writes.

use anyhow::anyhow;
use chrono::{DateTime, Days, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    entities::subscription_periods::{SubscriptionPeriodChangeset, SubscriptionPeriodEntity},
    errors::{ConflictReason, LifecycleError, LifecycleResult},
};

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> LifecycleResult<Self> {
        if start > end {
            return Err(LifecycleError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Two ranges overlap when they share at least one calendar day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

impl SubscriptionPeriodEntity {
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.cancelled_at.is_some()
    }
}

/// First non-canceled period (other than `exclude`) whose range intersects `candidate`.
pub fn find_overlap<'a, I>(candidate: &DateRange, existing: I, exclude: Option<Uuid>) -> Option<Uuid>
where
    I: IntoIterator<Item = &'a SubscriptionPeriodEntity>,
{
    existing
        .into_iter()
        .filter(|period| Some(period.id) != exclude)
        .filter(|period| !period.is_canceled())
        .find(|period| period.date_range().overlaps(candidate))
        .map(|period| period.id)
}

pub fn ensure_no_overlap<'a, I>(
    candidate: &DateRange,
    existing: I,
    exclude: Option<Uuid>,
) -> LifecycleResult<()>
where
    I: IntoIterator<Item = &'a SubscriptionPeriodEntity>,
{
    match find_overlap(candidate, existing, exclude) {
        Some(existing_period_id) => Err(LifecycleError::Conflict(ConflictReason::Overlap {
            existing_period_id,
        })),
        None => Ok(()),
    }
}

/// Range the period would have once `changeset` is applied.
pub fn merged_range(
    current: &SubscriptionPeriodEntity,
    changeset: &SubscriptionPeriodChangeset,
) -> LifecycleResult<DateRange> {
    DateRange::new(
        changeset.start_date.unwrap_or(current.start_date),
        changeset.end_date.unwrap_or(current.end_date),
    )
}

/// Cancel keeps the first cancellation timestamp, so repeating it is harmless.
pub fn cancellation_timestamp(
    current: &SubscriptionPeriodEntity,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    current.cancelled_at.unwrap_or(now)
}

pub fn pause_date(current: &SubscriptionPeriodEntity, today: NaiveDate) -> LifecycleResult<NaiveDate> {
    if current.is_canceled() {
        return Err(LifecycleError::Conflict(ConflictReason::PauseCanceled));
    }
    if current.paused_at.is_some() {
        return Err(LifecycleError::Conflict(ConflictReason::AlreadyPaused));
    }
    Ok(today)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePlan {
    pub end_date: NaiveDate,
    pub added_days: i64,
}

/// Days spent paused are handed back by pushing `end_date` forward; the
/// entitlement never shrinks, even if `paused_at` lies in the future.
pub fn plan_resume(current: &SubscriptionPeriodEntity, today: NaiveDate) -> LifecycleResult<ResumePlan> {
    let paused_at = current
        .paused_at
        .ok_or(LifecycleError::Conflict(ConflictReason::NotPaused))?;

    let added_days = (today - paused_at).num_days().max(0);
    let end_date = current
        .end_date
        .checked_add_days(Days::new(added_days.unsigned_abs()))
        .ok_or_else(|| {
            LifecycleError::Store(anyhow!(
                "end date {} plus {} days is out of range",
                current.end_date,
                added_days
            ))
        })?;

    Ok(ResumePlan {
        end_date,
        added_days,
    })
}

/// Live period of the same member that the resumed range would now reach into.
/// Resume still applies; the overlap is reported back like a restore's.
pub fn resume_overlap<'a, I>(
    current: &SubscriptionPeriodEntity,
    plan: &ResumePlan,
    existing: I,
) -> Option<Uuid>
where
    I: IntoIterator<Item = &'a SubscriptionPeriodEntity>,
{
    let resumed = DateRange {
        start: current.start_date,
        end: plan.end_date,
    };
    find_overlap(&resumed, existing, Some(current.id))
}
