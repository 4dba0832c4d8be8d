use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::subscription_periods;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscription_periods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriptionPeriodEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub paused_at: Option<NaiveDate>,
    pub price_minor: i32,
    pub plan_name: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscription_periods)]
pub struct InsertSubscriptionPeriodEntity {
    pub member_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_minor: i32,
    pub plan_name: String,
    pub payment_status: String,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = subscription_periods)]
pub struct SubscriptionPeriodChangeset {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub price_minor: Option<i32>,
    pub plan_name: Option<String>,
    pub payment_status: Option<String>,
}

impl SubscriptionPeriodChangeset {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.price_minor.is_none()
            && self.plan_name.is_none()
            && self.payment_status.is_none()
    }

    pub fn changes_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}
