use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::subscription_periods::SubscriptionPeriodEntity,
    value_objects::{enums::period_statuses::PeriodStatus, status_projection::project},
};

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionPeriodRequest {
    pub member_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    pub payment_status: Option<String>,
    pub price_minor: i32,
    pub plan_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionPeriodRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub payment_status: Option<String>,
    pub price_minor: Option<i32>,
    pub plan_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSubscriptionPeriodsQuery {
    pub member_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// Store-level filter. `status` is matched with the same precedence the
/// projector uses, evaluated against `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSubscriptionPeriodsFilter {
    pub member_id: Option<Uuid>,
    pub status: Option<PeriodStatus>,
    pub today: NaiveDate,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestoreOutcome {
    pub period: SubscriptionPeriodEntity,
    pub overlapping_period_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeOutcome {
    pub period: SubscriptionPeriodEntity,
    pub added_days: i64,
    pub overlapping_period_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionPeriodDto {
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
    pub status: PeriodStatus,
    pub days_left: Option<i64>,
}

impl SubscriptionPeriodDto {
    pub fn project(entity: SubscriptionPeriodEntity, today: NaiveDate) -> Self {
        let projection = project(&entity, today);
        Self {
            id: entity.id,
            member_id: entity.member_id,
            start_date: entity.start_date,
            end_date: entity.end_date,
            cancelled_at: entity.cancelled_at,
            paused_at: entity.paused_at,
            price_minor: entity.price_minor,
            plan_name: entity.plan_name,
            payment_status: entity.payment_status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            status: projection.status,
            days_left: projection.days_left,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedPeriodResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AffectedResponse {
    pub affected: u64,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub affected: u64,
    pub overlapping_period_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub affected: u64,
    pub added_days: i64,
    pub overlapping_period_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::period_lifecycle::test_support::{date, period};

    #[test]
    fn dto_carries_projected_status() {
        let entity = period(Uuid::new_v4(), "2024-01-01", "2024-01-31");

        let dto = SubscriptionPeriodDto::project(entity.clone(), date("2024-01-11"));

        assert_eq!(dto.id, entity.id);
        assert_eq!(dto.status, PeriodStatus::Active);
        assert_eq!(dto.days_left, Some(20));
    }

    #[test]
    fn dto_serializes_status_and_dates_for_the_client() {
        let entity = period(Uuid::new_v4(), "2024-01-01", "2024-01-31");

        let json = serde_json::to_value(SubscriptionPeriodDto::project(entity, date("2024-02-02"))).unwrap();

        assert_eq!(json["status"], "expired");
        assert_eq!(json["days_left"], serde_json::Value::Null);
        assert_eq!(json["start_date"], "2024-01-01");
    }
}
