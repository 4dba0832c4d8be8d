use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{PgConnection, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{members, subscription_periods},
    },
};
use domain::{
    entities::subscription_periods::{
        InsertSubscriptionPeriodEntity, SubscriptionPeriodChangeset, SubscriptionPeriodEntity,
    },
    errors::{LifecycleError, LifecycleResult},
    repositories::subscription_periods::SubscriptionPeriodRepository,
    value_objects::{
        enums::period_statuses::PeriodStatus,
        period_lifecycle::{
            DateRange, cancellation_timestamp, ensure_no_overlap, find_overlap, merged_range,
            pause_date, plan_resume, resume_overlap,
        },
        subscription_periods::{ListSubscriptionPeriodsFilter, RestoreOutcome, ResumeOutcome},
    },
};

pub struct SubscriptionPeriodPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPeriodPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

// Lock order is always member row first, then that member's period rows.
// Holding the member lock serialises every lifecycle write for the member.
fn lock_member(conn: &mut PgConnection, member_id: Uuid) -> LifecycleResult<()> {
    members::table
        .find(member_id)
        .select(members::id)
        .for_update()
        .first::<Uuid>(conn)
        .optional()?
        .map(|_| ())
        .ok_or(LifecycleError::MemberNotFound(member_id))
}

/// Locks the owning member, then the period itself, and returns the fresh row.
fn lock_period(conn: &mut PgConnection, period_id: Uuid) -> LifecycleResult<SubscriptionPeriodEntity> {
    let member_id = subscription_periods::table
        .find(period_id)
        .select(subscription_periods::member_id)
        .first::<Uuid>(conn)
        .optional()?
        .ok_or(LifecycleError::PeriodNotFound(period_id))?;

    lock_member(conn, member_id)?;

    subscription_periods::table
        .find(period_id)
        .select(SubscriptionPeriodEntity::as_select())
        .for_update()
        .first::<SubscriptionPeriodEntity>(conn)
        .optional()?
        .ok_or(LifecycleError::PeriodNotFound(period_id))
}

fn live_periods_of_member(
    conn: &mut PgConnection,
    member_id: Uuid,
) -> LifecycleResult<Vec<SubscriptionPeriodEntity>> {
    let periods = subscription_periods::table
        .filter(subscription_periods::member_id.eq(member_id))
        .filter(subscription_periods::cancelled_at.is_null())
        .select(SubscriptionPeriodEntity::as_select())
        .for_update()
        .load::<SubscriptionPeriodEntity>(conn)?;

    Ok(periods)
}

#[async_trait]
impl SubscriptionPeriodRepository for SubscriptionPeriodPostgres {
    async fn create(&self, insert_entity: InsertSubscriptionPeriodEntity) -> LifecycleResult<Uuid> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("failed to acquire postgres connection")?;

        let result = conn.transaction::<Uuid, LifecycleError, _>(|tx| {
            lock_member(tx, insert_entity.member_id)?;

            let candidate = DateRange::new(insert_entity.start_date, insert_entity.end_date)?;
            let existing = live_periods_of_member(tx, insert_entity.member_id)?;
            ensure_no_overlap(&candidate, &existing, None)?;

            let period_id = insert_into(subscription_periods::table)
                .values(&insert_entity)
                .returning(subscription_periods::id)
                .get_result::<Uuid>(tx)?;

            Ok(period_id)
        })?;

        Ok(result)
    }

    async fn update(
        &self,
        period_id: Uuid,
        changeset: SubscriptionPeriodChangeset,
    ) -> LifecycleResult<SubscriptionPeriodEntity> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("failed to acquire postgres connection")?;

        let result = conn.transaction::<SubscriptionPeriodEntity, LifecycleError, _>(|tx| {
            let current = lock_period(tx, period_id)?;

            if changeset.changes_dates() {
                let prospective = merged_range(&current, &changeset)?;
                let existing = live_periods_of_member(tx, current.member_id)?;
                ensure_no_overlap(&prospective, &existing, Some(period_id))?;
            }

            let updated = diesel::update(subscription_periods::table.find(period_id))
                .set((&changeset, subscription_periods::updated_at.eq(Utc::now())))
                .returning(SubscriptionPeriodEntity::as_returning())
                .get_result::<SubscriptionPeriodEntity>(tx)?;

            Ok(updated)
        })?;

        Ok(result)
    }

    async fn cancel(
        &self,
        period_id: Uuid,
        now: DateTime<Utc>,
    ) -> LifecycleResult<SubscriptionPeriodEntity> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("failed to acquire postgres connection")?;

        let result = conn.transaction::<SubscriptionPeriodEntity, LifecycleError, _>(|tx| {
            let current = lock_period(tx, period_id)?;
            let cancelled_at = cancellation_timestamp(&current, now);

            let updated = diesel::update(subscription_periods::table.find(period_id))
                .set((
                    subscription_periods::cancelled_at.eq(Some(cancelled_at)),
                    subscription_periods::updated_at.eq(now),
                ))
                .returning(SubscriptionPeriodEntity::as_returning())
                .get_result::<SubscriptionPeriodEntity>(tx)?;

            Ok(updated)
        })?;

        Ok(result)
    }

    async fn restore(&self, period_id: Uuid) -> LifecycleResult<RestoreOutcome> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("failed to acquire postgres connection")?;

        let result = conn.transaction::<RestoreOutcome, LifecycleError, _>(|tx| {
            let current = lock_period(tx, period_id)?;

            let existing = live_periods_of_member(tx, current.member_id)?;
            let overlapping_period_id =
                find_overlap(&current.date_range(), &existing, Some(period_id));

            let period = diesel::update(subscription_periods::table.find(period_id))
                .set((
                    subscription_periods::cancelled_at.eq(None::<DateTime<Utc>>),
                    subscription_periods::updated_at.eq(Utc::now()),
                ))
                .returning(SubscriptionPeriodEntity::as_returning())
                .get_result::<SubscriptionPeriodEntity>(tx)?;

            Ok(RestoreOutcome {
                period,
                overlapping_period_id,
            })
        })?;

        Ok(result)
    }

    async fn pause(
        &self,
        period_id: Uuid,
        today: NaiveDate,
    ) -> LifecycleResult<SubscriptionPeriodEntity> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("failed to acquire postgres connection")?;

        let result = conn.transaction::<SubscriptionPeriodEntity, LifecycleError, _>(|tx| {
            let current = lock_period(tx, period_id)?;
            let paused_at = pause_date(&current, today)?;

            let updated = diesel::update(subscription_periods::table.find(period_id))
                .set((
                    subscription_periods::paused_at.eq(Some(paused_at)),
                    subscription_periods::updated_at.eq(Utc::now()),
                ))
                .returning(SubscriptionPeriodEntity::as_returning())
                .get_result::<SubscriptionPeriodEntity>(tx)?;

            Ok(updated)
        })?;

        Ok(result)
    }

    async fn resume(&self, period_id: Uuid, today: NaiveDate) -> LifecycleResult<ResumeOutcome> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("failed to acquire postgres connection")?;

        let result = conn.transaction::<ResumeOutcome, LifecycleError, _>(|tx| {
            let current = lock_period(tx, period_id)?;
            let plan = plan_resume(&current, today)?;
            let existing = live_periods_of_member(tx, current.member_id)?;
            let overlapping_period_id = resume_overlap(&current, &plan, &existing);

            let period = diesel::update(subscription_periods::table.find(period_id))
                .set((
                    subscription_periods::end_date.eq(plan.end_date),
                    subscription_periods::paused_at.eq(None::<NaiveDate>),
                    subscription_periods::updated_at.eq(Utc::now()),
                ))
                .returning(SubscriptionPeriodEntity::as_returning())
                .get_result::<SubscriptionPeriodEntity>(tx)?;

            Ok(ResumeOutcome {
                period,
                added_days: plan.added_days,
                overlapping_period_id,
            })
        })?;

        Ok(result)
    }

    async fn delete_hard(&self, period_id: Uuid) -> LifecycleResult<()> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("failed to acquire postgres connection")?;

        let deleted = diesel::delete(subscription_periods::table.find(period_id))
            .execute(&mut conn)
            .map_err(LifecycleError::from)?;

        if deleted == 0 {
            return Err(LifecycleError::PeriodNotFound(period_id));
        }

        debug!(%period_id, "subscription_periods: row deleted");
        Ok(())
    }

    async fn find_by_id(&self, period_id: Uuid) -> Result<Option<SubscriptionPeriodEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscription_periods::table
            .find(period_id)
            .select(SubscriptionPeriodEntity::as_select())
            .first::<SubscriptionPeriodEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list(
        &self,
        filter: ListSubscriptionPeriodsFilter,
    ) -> Result<Vec<SubscriptionPeriodEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = subscription_periods::table
            .select(SubscriptionPeriodEntity::as_select())
            .order((
                subscription_periods::start_date.desc(),
                subscription_periods::created_at.desc(),
            ))
            .into_boxed();

        if let Some(member_id) = filter.member_id {
            query = query.filter(subscription_periods::member_id.eq(member_id));
        }

        // canceled > paused > expired > active, as in the status projector
        if let Some(status) = filter.status {
            query = match status {
                PeriodStatus::Canceled => query.filter(subscription_periods::cancelled_at.is_not_null()),
                PeriodStatus::Paused => query
                    .filter(subscription_periods::cancelled_at.is_null())
                    .filter(subscription_periods::paused_at.is_not_null()),
                PeriodStatus::Expired => query
                    .filter(subscription_periods::cancelled_at.is_null())
                    .filter(subscription_periods::paused_at.is_null())
                    .filter(subscription_periods::end_date.lt(filter.today)),
                PeriodStatus::Active => query
                    .filter(subscription_periods::cancelled_at.is_null())
                    .filter(subscription_periods::paused_at.is_null())
                    .filter(subscription_periods::end_date.ge(filter.today)),
            };
        }

        let results = query
            .limit(filter.limit)
            .load::<SubscriptionPeriodEntity>(&mut conn)?;

        Ok(results)
    }
}
