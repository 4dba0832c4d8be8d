//! Monthly cohort aggregation over historical subscription periods.

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::subscription_periods::SubscriptionPeriodEntity,
    value_objects::{
        enums::payment_statuses::PaymentStatus,
        year_months::{YearMonth, months_inclusive},
    },
};

/// Inclusive month range a report covers. Construction guarantees `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohortWindow {
    from: YearMonth,
    to: YearMonth,
}

impl CohortWindow {
    pub fn new(from: YearMonth, to: YearMonth) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    pub fn from(&self) -> YearMonth {
        self.from
    }

    pub fn to(&self) -> YearMonth {
        self.to
    }

    pub fn first_day(&self) -> NaiveDate {
        self.from.first_day()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.to.last_day()
    }

    pub fn month_count(&self) -> usize {
        self.from.months_until(&self.to).unsigned_abs() as usize + 1
    }

    fn index_of(&self, month: YearMonth) -> Option<usize> {
        if month < self.from || month > self.to {
            return None;
        }
        Some(self.from.months_until(&month).unsigned_abs() as usize)
    }
}

/// Rows a report is computed from.
///
/// `first_start_by_member` must hold each involved member's earliest
/// `start_date` across their whole history, not only the rows in `periods`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortSnapshot {
    pub periods: Vec<SubscriptionPeriodEntity>,
    pub first_start_by_member: HashMap<Uuid, NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentBuckets {
    pub pending: Vec<u64>,
    pub paid: Vec<u64>,
    pub failed: Vec<u64>,
    pub refunded: Vec<u64>,
}

impl PaymentBuckets {
    fn zeroed(len: usize) -> Self {
        Self {
            pending: vec![0; len],
            paid: vec![0; len],
            failed: vec![0; len],
            refunded: vec![0; len],
        }
    }

    fn bucket_mut(&mut self, status: PaymentStatus) -> &mut Vec<u64> {
        match status {
            PaymentStatus::Pending => &mut self.pending,
            PaymentStatus::Paid => &mut self.paid,
            PaymentStatus::Failed => &mut self.failed,
            PaymentStatus::Refunded => &mut self.refunded,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CohortReport {
    pub labels: Vec<String>,
    pub new: Vec<u64>,
    pub renew: Vec<u64>,
    pub canceled: Vec<u64>,
    pub expired: Vec<u64>,
    pub payments: PaymentBuckets,
}

impl CohortReport {
    fn empty(window: &CohortWindow) -> Self {
        let labels: Vec<String> = months_inclusive(window.from, window.to)
            .iter()
            .map(ToString::to_string)
            .collect();
        let len = labels.len();

        Self {
            labels,
            new: vec![0; len],
            renew: vec![0; len],
            canceled: vec![0; len],
            expired: vec![0; len],
            payments: PaymentBuckets::zeroed(len),
        }
    }
}

/// A period renews when its member already had a period starting strictly
/// earlier. Decided from the member's full history, never from insertion order.
pub fn is_renewal(period: &SubscriptionPeriodEntity, first_start_by_member: &HashMap<Uuid, NaiveDate>) -> bool {
    first_start_by_member
        .get(&period.member_id)
        .is_some_and(|first_start| *first_start < period.start_date)
}

/// Buckets the snapshot into one row per month of `window`. Months with no
/// data still appear, zero-filled, so the series has no gaps.
pub fn build_cohort_report(window: &CohortWindow, snapshot: &CohortSnapshot) -> CohortReport {
    let mut report = CohortReport::empty(window);

    for period in &snapshot.periods {
        if let Some(idx) = window.index_of(YearMonth::of(period.start_date)) {
            if is_renewal(period, &snapshot.first_start_by_member) {
                report.renew[idx] += 1;
            } else {
                report.new[idx] += 1;
            }

            if let Some(status) = PaymentStatus::from_str(&period.payment_status) {
                report.payments.bucket_mut(status)[idx] += 1;
            }
        }

        match period.cancelled_at {
            Some(cancelled_at) => {
                let cancelled_on = cancelled_at.with_timezone(&Local).date_naive();
                if let Some(idx) = window.index_of(YearMonth::of(cancelled_on)) {
                    report.canceled[idx] += 1;
                }
            }
            None => {
                if let Some(idx) = window.index_of(YearMonth::of(period.end_date)) {
                    report.expired[idx] += 1;
                }
            }
        }
    }

    report
}
