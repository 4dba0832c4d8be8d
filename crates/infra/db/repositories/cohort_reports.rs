use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use diesel::{RunQueryDsl, dsl::min, prelude::*};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::subscription_periods},
};
use domain::{
    entities::subscription_periods::SubscriptionPeriodEntity,
    repositories::cohort_reports::CohortReportRepository,
    value_objects::cohort_reports::{CohortSnapshot, CohortWindow},
};

pub struct CohortReportPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CohortReportPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn local_midnight_utc(date: NaiveDate) -> chrono::DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[async_trait]
impl CohortReportRepository for CohortReportPostgres {
    async fn load_snapshot(&self, window: CohortWindow) -> Result<CohortSnapshot> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let first_day = window.first_day();
        let last_day = window.last_day();
        // Widened by a day on each side; the aggregator buckets by local day exactly.
        let cancelled_from = local_midnight_utc(first_day.checked_sub_days(Days::new(1)).unwrap_or(first_day));
        let cancelled_until = local_midnight_utc(last_day.checked_add_days(Days::new(2)).unwrap_or(last_day));

        let periods = subscription_periods::table
            .select(SubscriptionPeriodEntity::as_select())
            .filter(
                subscription_periods::start_date
                    .between(first_day, last_day)
                    .or(subscription_periods::end_date.between(first_day, last_day))
                    .or(subscription_periods::cancelled_at
                        .ge(cancelled_from)
                        .and(subscription_periods::cancelled_at.lt(cancelled_until))),
            )
            .order(subscription_periods::start_date.asc())
            .load::<SubscriptionPeriodEntity>(&mut conn)?;

        let mut member_ids: Vec<Uuid> = periods.iter().map(|period| period.member_id).collect();
        member_ids.sort_unstable();
        member_ids.dedup();

        let first_start_by_member: HashMap<Uuid, NaiveDate> = if member_ids.is_empty() {
            HashMap::new()
        } else {
            subscription_periods::table
                .filter(subscription_periods::member_id.eq_any(&member_ids))
                .group_by(subscription_periods::member_id)
                .select((
                    subscription_periods::member_id,
                    min(subscription_periods::start_date),
                ))
                .load::<(Uuid, Option<NaiveDate>)>(&mut conn)?
                .into_iter()
                .filter_map(|(member_id, first_start)| first_start.map(|date| (member_id, date)))
                .collect()
        };

        Ok(CohortSnapshot {
            periods,
            first_start_by_member,
        })
    }
}
