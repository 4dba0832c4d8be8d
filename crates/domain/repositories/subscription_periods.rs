use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::subscription_periods::{
        InsertSubscriptionPeriodEntity, SubscriptionPeriodChangeset, SubscriptionPeriodEntity,
    },
    errors::LifecycleResult,
    value_objects::subscription_periods::{
        ListSubscriptionPeriodsFilter, RestoreOutcome, ResumeOutcome,
    },
};

/// Entitlement store for subscription periods.
///
/// Every write runs in its own transaction holding the owning member's row
/// lock, so the overlap check and the write it guards are atomic.
#[automock]
#[async_trait]
pub trait SubscriptionPeriodRepository {
    async fn create(&self, insert_entity: InsertSubscriptionPeriodEntity) -> LifecycleResult<Uuid>;

    async fn update(
        &self,
        period_id: Uuid,
        changeset: SubscriptionPeriodChangeset,
    ) -> LifecycleResult<SubscriptionPeriodEntity>;

    async fn cancel(
        &self,
        period_id: Uuid,
        now: DateTime<Utc>,
    ) -> LifecycleResult<SubscriptionPeriodEntity>;

    /// Clears `cancelled_at` without rejecting overlaps; any overlap found is reported back.
    async fn restore(&self, period_id: Uuid) -> LifecycleResult<RestoreOutcome>;

    async fn pause(
        &self,
        period_id: Uuid,
        today: NaiveDate,
    ) -> LifecycleResult<SubscriptionPeriodEntity>;

    async fn resume(&self, period_id: Uuid, today: NaiveDate) -> LifecycleResult<ResumeOutcome>;

    async fn delete_hard(&self, period_id: Uuid) -> LifecycleResult<()>;

    async fn find_by_id(&self, period_id: Uuid) -> Result<Option<SubscriptionPeriodEntity>>;

    async fn list(
        &self,
        filter: ListSubscriptionPeriodsFilter,
    ) -> Result<Vec<SubscriptionPeriodEntity>>;
}
