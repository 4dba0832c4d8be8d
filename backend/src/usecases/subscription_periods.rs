use std::sync::Arc;

use chrono::NaiveDate;
use membership_core::domain::{
    clock::Clock,
    entities::subscription_periods::{InsertSubscriptionPeriodEntity, SubscriptionPeriodChangeset},
    errors::LifecycleError,
    repositories::subscription_periods::SubscriptionPeriodRepository,
    value_objects::{
        enums::{payment_statuses::PaymentStatus, period_statuses::PeriodStatus},
        subscription_periods::{
            CreateSubscriptionPeriodRequest, DEFAULT_LIST_LIMIT, ListSubscriptionPeriodsFilter,
            ListSubscriptionPeriodsQuery, MAX_LIST_LIMIT, RestoreResponse, ResumeResponse,
            SubscriptionPeriodDto, UpdateSubscriptionPeriodRequest,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::{AuthStaff, Operation, authorize};

const MAX_PLAN_NAME_LEN: usize = 120;

#[derive(Debug, Error)]
pub enum SubscriptionPeriodError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("no fields to update")]
    NoChanges,
    #[error("not allowed to {0} subscription periods")]
    Forbidden(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionPeriodError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionPeriodError::Validation(_) | SubscriptionPeriodError::NoChanges => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionPeriodError::NotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionPeriodError::Conflict(_) => StatusCode::CONFLICT,
            SubscriptionPeriodError::Forbidden(_) => StatusCode::FORBIDDEN,
            SubscriptionPeriodError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LifecycleError> for SubscriptionPeriodError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::MemberNotFound(_) | LifecycleError::PeriodNotFound(_) => {
                SubscriptionPeriodError::NotFound(err.to_string())
            }
            LifecycleError::InvalidDateRange { .. } => {
                SubscriptionPeriodError::Validation(err.to_string())
            }
            LifecycleError::Conflict(reason) => SubscriptionPeriodError::Conflict(reason.to_string()),
            LifecycleError::Store(inner) => SubscriptionPeriodError::Internal(inner),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionPeriodError>;

pub fn parse_date(field: &str, value: &str) -> UseCaseResult<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() != 10 {
        return Err(SubscriptionPeriodError::Validation(format!(
            "{field} must be a YYYY-MM-DD date"
        )));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        SubscriptionPeriodError::Validation(format!("{field} must be a YYYY-MM-DD date"))
    })
}

fn parse_payment_status(value: &str) -> UseCaseResult<PaymentStatus> {
    PaymentStatus::from_str(value.trim()).ok_or_else(|| {
        SubscriptionPeriodError::Validation(
            "payment_status must be one of pending, paid, failed, refunded".to_string(),
        )
    })
}

fn validate_price(price_minor: i32) -> UseCaseResult<i32> {
    if price_minor < 0 {
        return Err(SubscriptionPeriodError::Validation(
            "price_minor must not be negative".to_string(),
        ));
    }
    Ok(price_minor)
}

fn validate_plan_name(plan_name: &str) -> UseCaseResult<String> {
    let trimmed = plan_name.trim();
    if trimmed.is_empty() {
        return Err(SubscriptionPeriodError::Validation(
            "plan_name must not be blank".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_PLAN_NAME_LEN {
        return Err(SubscriptionPeriodError::Validation(format!(
            "plan_name must be at most {MAX_PLAN_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_create(
    request: CreateSubscriptionPeriodRequest,
) -> UseCaseResult<InsertSubscriptionPeriodEntity> {
    let start_date = parse_date("start_date", &request.start_date)?;
    let end_date = parse_date("end_date", &request.end_date)?;
    if start_date > end_date {
        return Err(SubscriptionPeriodError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }

    let payment_status = match request.payment_status.as_deref() {
        Some(raw) => parse_payment_status(raw)?,
        None => PaymentStatus::default(),
    };

    Ok(InsertSubscriptionPeriodEntity {
        member_id: request.member_id,
        start_date,
        end_date,
        price_minor: validate_price(request.price_minor)?,
        plan_name: validate_plan_name(&request.plan_name)?,
        payment_status: payment_status.to_string(),
    })
}

pub fn validate_update(
    request: UpdateSubscriptionPeriodRequest,
) -> UseCaseResult<SubscriptionPeriodChangeset> {
    let changeset = SubscriptionPeriodChangeset {
        start_date: request
            .start_date
            .as_deref()
            .map(|raw| parse_date("start_date", raw))
            .transpose()?,
        end_date: request
            .end_date
            .as_deref()
            .map(|raw| parse_date("end_date", raw))
            .transpose()?,
        price_minor: request.price_minor.map(validate_price).transpose()?,
        plan_name: request
            .plan_name
            .as_deref()
            .map(validate_plan_name)
            .transpose()?,
        payment_status: request
            .payment_status
            .as_deref()
            .map(|raw| parse_payment_status(raw).map(|status| status.to_string()))
            .transpose()?,
    };

    if changeset.is_empty() {
        return Err(SubscriptionPeriodError::NoChanges);
    }

    if let (Some(start_date), Some(end_date)) = (changeset.start_date, changeset.end_date) {
        if start_date > end_date {
            return Err(SubscriptionPeriodError::Validation(
                "start_date must not be after end_date".to_string(),
            ));
        }
    }

    Ok(changeset)
}

pub fn validate_list_query(
    query: ListSubscriptionPeriodsQuery,
    today: NaiveDate,
) -> UseCaseResult<ListSubscriptionPeriodsFilter> {
    let status = query
        .status
        .as_deref()
        .map(|raw| {
            PeriodStatus::from_str(raw.trim()).ok_or_else(|| {
                SubscriptionPeriodError::Validation(
                    "status must be one of active, paused, canceled, expired".to_string(),
                )
            })
        })
        .transpose()?;

    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(SubscriptionPeriodError::Validation(format!(
            "limit must be between 1 and {MAX_LIST_LIMIT}"
        )));
    }

    Ok(ListSubscriptionPeriodsFilter {
        member_id: query.member_id,
        status,
        today,
        limit,
    })
}

pub struct SubscriptionPeriodUseCase<S, C>
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    subscription_period_repo: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> SubscriptionPeriodUseCase<S, C>
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(subscription_period_repo: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            subscription_period_repo,
            clock,
        }
    }

    fn ensure_allowed(&self, staff: &AuthStaff, operation: Operation) -> UseCaseResult<()> {
        if authorize(staff, operation) {
            return Ok(());
        }

        let err = SubscriptionPeriodError::Forbidden(operation.name());
        warn!(
            staff_id = %staff.staff_id,
            role = ?staff.role,
            operation = operation.name(),
            status = err.status_code().as_u16(),
            "subscription_periods: operation forbidden"
        );
        Err(err)
    }

    fn log_rejection(operation: Operation, period_id: Option<Uuid>, err: &SubscriptionPeriodError) {
        match err {
            SubscriptionPeriodError::Internal(inner) => error!(
                operation = operation.name(),
                period_id = ?period_id,
                db_error = ?inner,
                "subscription_periods: store failure"
            ),
            _ => warn!(
                operation = operation.name(),
                period_id = ?period_id,
                status = err.status_code().as_u16(),
                reason = %err,
                "subscription_periods: operation rejected"
            ),
        }
    }

    pub async fn create(
        &self,
        staff: &AuthStaff,
        request: CreateSubscriptionPeriodRequest,
    ) -> UseCaseResult<Uuid> {
        self.ensure_allowed(staff, Operation::Create)?;
        let insert_entity = validate_create(request).inspect_err(|err| {
            Self::log_rejection(Operation::Create, None, err);
        })?;

        info!(
            staff_id = %staff.staff_id,
            member_id = %insert_entity.member_id,
            start_date = %insert_entity.start_date,
            end_date = %insert_entity.end_date,
            "subscription_periods: creating period"
        );

        let member_id = insert_entity.member_id;
        let period_id = self
            .subscription_period_repo
            .create(insert_entity)
            .await
            .map_err(SubscriptionPeriodError::from)
            .inspect_err(|err| Self::log_rejection(Operation::Create, None, err))?;

        info!(%period_id, %member_id, "subscription_periods: period created");
        Ok(period_id)
    }

    pub async fn update(
        &self,
        staff: &AuthStaff,
        period_id: Uuid,
        request: UpdateSubscriptionPeriodRequest,
    ) -> UseCaseResult<u64> {
        self.ensure_allowed(staff, Operation::Update)?;
        let changeset = validate_update(request)
            .inspect_err(|err| Self::log_rejection(Operation::Update, Some(period_id), err))?;

        info!(
            staff_id = %staff.staff_id,
            %period_id,
            changes_dates = changeset.changes_dates(),
            "subscription_periods: updating period"
        );

        self.subscription_period_repo
            .update(period_id, changeset)
            .await
            .map_err(SubscriptionPeriodError::from)
            .inspect_err(|err| Self::log_rejection(Operation::Update, Some(period_id), err))?;

        Ok(1)
    }

    pub async fn cancel(&self, staff: &AuthStaff, period_id: Uuid) -> UseCaseResult<u64> {
        self.ensure_allowed(staff, Operation::Cancel)?;

        let period = self
            .subscription_period_repo
            .cancel(period_id, self.clock.now())
            .await
            .map_err(SubscriptionPeriodError::from)
            .inspect_err(|err| Self::log_rejection(Operation::Cancel, Some(period_id), err))?;

        info!(
            staff_id = %staff.staff_id,
            %period_id,
            cancelled_at = ?period.cancelled_at,
            "subscription_periods: period canceled"
        );
        Ok(1)
    }

    pub async fn restore(&self, staff: &AuthStaff, period_id: Uuid) -> UseCaseResult<RestoreResponse> {
        self.ensure_allowed(staff, Operation::Restore)?;

        let outcome = self
            .subscription_period_repo
            .restore(period_id)
            .await
            .map_err(SubscriptionPeriodError::from)
            .inspect_err(|err| Self::log_rejection(Operation::Restore, Some(period_id), err))?;

        match outcome.overlapping_period_id {
            Some(overlapping_period_id) => warn!(
                staff_id = %staff.staff_id,
                %period_id,
                member_id = %outcome.period.member_id,
                %overlapping_period_id,
                "subscription_periods: restored period overlaps another live period"
            ),
            None => info!(staff_id = %staff.staff_id, %period_id, "subscription_periods: period restored"),
        }

        Ok(RestoreResponse {
            affected: 1,
            overlapping_period_id: outcome.overlapping_period_id,
        })
    }

    pub async fn pause(&self, staff: &AuthStaff, period_id: Uuid) -> UseCaseResult<u64> {
        self.ensure_allowed(staff, Operation::Pause)?;

        let period = self
            .subscription_period_repo
            .pause(period_id, self.clock.today())
            .await
            .map_err(SubscriptionPeriodError::from)
            .inspect_err(|err| Self::log_rejection(Operation::Pause, Some(period_id), err))?;

        info!(
            staff_id = %staff.staff_id,
            %period_id,
            paused_at = ?period.paused_at,
            "subscription_periods: period paused"
        );
        Ok(1)
    }

    pub async fn resume(&self, staff: &AuthStaff, period_id: Uuid) -> UseCaseResult<ResumeResponse> {
        self.ensure_allowed(staff, Operation::Resume)?;

        let outcome = self
            .subscription_period_repo
            .resume(period_id, self.clock.today())
            .await
            .map_err(SubscriptionPeriodError::from)
            .inspect_err(|err| Self::log_rejection(Operation::Resume, Some(period_id), err))?;

        match outcome.overlapping_period_id {
            Some(overlapping_period_id) => warn!(
                staff_id = %staff.staff_id,
                %period_id,
                member_id = %outcome.period.member_id,
                added_days = outcome.added_days,
                end_date = %outcome.period.end_date,
                %overlapping_period_id,
                "subscription_periods: resumed period now overlaps another live period"
            ),
            None => info!(
                staff_id = %staff.staff_id,
                %period_id,
                added_days = outcome.added_days,
                end_date = %outcome.period.end_date,
                "subscription_periods: period resumed"
            ),
        }

        Ok(ResumeResponse {
            affected: 1,
            added_days: outcome.added_days,
            overlapping_period_id: outcome.overlapping_period_id,
        })
    }

    pub async fn delete_hard(&self, staff: &AuthStaff, period_id: Uuid) -> UseCaseResult<u64> {
        self.ensure_allowed(staff, Operation::DeleteHard)?;

        self.subscription_period_repo
            .delete_hard(period_id)
            .await
            .map_err(SubscriptionPeriodError::from)
            .inspect_err(|err| Self::log_rejection(Operation::DeleteHard, Some(period_id), err))?;

        warn!(staff_id = %staff.staff_id, %period_id, "subscription_periods: period permanently deleted");
        Ok(1)
    }

    pub async fn get(&self, staff: &AuthStaff, period_id: Uuid) -> UseCaseResult<SubscriptionPeriodDto> {
        self.ensure_allowed(staff, Operation::Read)?;

        let period = self
            .subscription_period_repo
            .find_by_id(period_id)
            .await
            .map_err(|err| {
                error!(%period_id, db_error = ?err, "subscription_periods: failed to load period");
                SubscriptionPeriodError::Internal(err)
            })?
            .ok_or_else(|| {
                SubscriptionPeriodError::NotFound(format!("subscription period {period_id} not found"))
            })?;

        Ok(SubscriptionPeriodDto::project(period, self.clock.today()))
    }

    pub async fn list(
        &self,
        staff: &AuthStaff,
        query: ListSubscriptionPeriodsQuery,
    ) -> UseCaseResult<Vec<SubscriptionPeriodDto>> {
        self.ensure_allowed(staff, Operation::Read)?;
        let today = self.clock.today();
        let filter = validate_list_query(query, today)?;

        let periods = self
            .subscription_period_repo
            .list(filter)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "subscription_periods: failed to list periods");
                SubscriptionPeriodError::Internal(err)
            })?;

        let rows: Vec<SubscriptionPeriodDto> = periods
            .into_iter()
            .map(|period| SubscriptionPeriodDto::project(period, today))
            .filter(|row| filter.status.is_none_or(|wanted| row.status == wanted))
            .take(filter.limit.unsigned_abs() as usize)
            .collect();

        info!(row_count = rows.len(), "subscription_periods: periods listed");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use membership_core::domain::{
        clock::MockClock,
        entities::subscription_periods::SubscriptionPeriodEntity,
        errors::ConflictReason,
        repositories::subscription_periods::MockSubscriptionPeriodRepository,
        value_objects::{
            permissions::{PermissionProfile, StaffRole, resolve},
            subscription_periods::{RestoreOutcome, ResumeOutcome},
        },
    };
    use mockall::predicate::eq;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn staff(role: StaffRole, profile: PermissionProfile) -> AuthStaff {
        AuthStaff {
            staff_id: Uuid::new_v4(),
            role,
            permissions: resolve(role, &profile),
        }
    }

    fn owner() -> AuthStaff {
        staff(StaffRole::Owner, PermissionProfile::RoleDefault)
    }

    fn clock_at(today: &str) -> MockClock {
        let today = date(today);
        let now: DateTime<Utc> = Utc.from_utc_datetime(&today.and_hms_opt(10, 0, 0).unwrap());
        let mut clock = MockClock::new();
        clock.expect_today().return_const(today);
        clock.expect_now().return_const(now);
        clock
    }

    fn sample_period(member_id: Uuid, start: &str, end: &str) -> SubscriptionPeriodEntity {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        SubscriptionPeriodEntity {
            id: Uuid::new_v4(),
            member_id,
            start_date: date(start),
            end_date: date(end),
            cancelled_at: None,
            paused_at: None,
            price_minor: 150_000,
            plan_name: "Monthly".to_string(),
            payment_status: "paid".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    fn create_request(member_id: Uuid, start: &str, end: &str) -> CreateSubscriptionPeriodRequest {
        CreateSubscriptionPeriodRequest {
            member_id,
            start_date: start.to_string(),
            end_date: end.to_string(),
            payment_status: None,
            price_minor: 150_000,
            plan_name: "  Monthly  ".to_string(),
        }
    }

    fn usecase(
        repo: MockSubscriptionPeriodRepository,
        clock: MockClock,
    ) -> SubscriptionPeriodUseCase<MockSubscriptionPeriodRepository, MockClock> {
        SubscriptionPeriodUseCase::new(Arc::new(repo), Arc::new(clock))
    }

    #[tokio::test]
    async fn create_passes_normalised_entity_to_the_store() {
        let member_id = Uuid::new_v4();
        let period_id = Uuid::new_v4();
        let expected = InsertSubscriptionPeriodEntity {
            member_id,
            start_date: date("2024-01-01"),
            end_date: date("2024-01-31"),
            price_minor: 150_000,
            plan_name: "Monthly".to_string(),
            payment_status: "pending".to_string(),
        };

        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_create()
            .with(eq(expected))
            .times(1)
            .returning(move |_| Ok(period_id));

        let created = usecase(repo, MockClock::new())
            .create(&owner(), create_request(member_id, "2024-01-01", "2024-01-31"))
            .await
            .unwrap();

        assert_eq!(created, period_id);
    }

    #[tokio::test]
    async fn create_overlapping_period_is_a_conflict() {
        let existing_period_id = Uuid::new_v4();
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_create().returning(move |_| {
            Err(LifecycleError::Conflict(ConflictReason::Overlap { existing_period_id }))
        });

        let err = usecase(repo, MockClock::new())
            .create(&owner(), create_request(Uuid::new_v4(), "2024-01-15", "2024-02-15"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionPeriodError::Conflict(_)));
        assert_eq!(err.status_code().as_u16(), 409);
    }

    #[tokio::test]
    async fn create_for_unknown_member_is_not_found() {
        let member_id = Uuid::new_v4();
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_create()
            .returning(move |_| Err(LifecycleError::MemberNotFound(member_id)));

        let err = usecase(repo, MockClock::new())
            .create(&owner(), create_request(member_id, "2024-01-01", "2024-01-31"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code().as_u16(), 404);
    }

    #[tokio::test]
    async fn malformed_input_is_rejected_before_the_store() {
        // no expectations: any repository call would panic
        let uc = usecase(MockSubscriptionPeriodRepository::new(), MockClock::new());
        let member_id = Uuid::new_v4();

        let cases = [
            create_request(member_id, "2024-1-01", "2024-01-31"),
            create_request(member_id, "2024-02-01", "2024-01-31"),
            CreateSubscriptionPeriodRequest {
                payment_status: Some("succeeded".to_string()),
                ..create_request(member_id, "2024-01-01", "2024-01-31")
            },
            CreateSubscriptionPeriodRequest {
                price_minor: -1,
                ..create_request(member_id, "2024-01-01", "2024-01-31")
            },
            CreateSubscriptionPeriodRequest {
                plan_name: "   ".to_string(),
                ..create_request(member_id, "2024-01-01", "2024-01-31")
            },
        ];

        for request in cases {
            let err = uc.create(&owner(), request).await.unwrap_err();
            assert!(matches!(err, SubscriptionPeriodError::Validation(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn staff_without_permission_is_forbidden_before_the_store() {
        let uc = usecase(MockSubscriptionPeriodRepository::new(), MockClock::new());
        let trainer = staff(StaffRole::Trainer, PermissionProfile::RoleDefault);

        let err = uc.pause(&trainer, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SubscriptionPeriodError::Forbidden("pause")));
        assert_eq!(err.status_code().as_u16(), 403);

        let read_only_owner = staff(StaffRole::Owner, PermissionProfile::ReadOnly);
        let err = uc.delete_hard(&read_only_owner, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SubscriptionPeriodError::Forbidden("delete_hard")));
    }

    #[tokio::test]
    async fn update_without_fields_is_a_no_op_error() {
        let uc = usecase(MockSubscriptionPeriodRepository::new(), MockClock::new());

        let err = uc
            .update(&owner(), Uuid::new_v4(), UpdateSubscriptionPeriodRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionPeriodError::NoChanges));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn update_forwards_only_supplied_fields() {
        let period_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();
        let expected = SubscriptionPeriodChangeset {
            end_date: Some(date("2024-02-10")),
            payment_status: Some("refunded".to_string()),
            ..Default::default()
        };

        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_update()
            .with(eq(period_id), eq(expected))
            .times(1)
            .returning(move |_, _| Ok(sample_period(member_id, "2024-01-01", "2024-02-10")));

        let affected = usecase(repo, MockClock::new())
            .update(
                &owner(),
                period_id,
                UpdateSubscriptionPeriodRequest {
                    end_date: Some("2024-02-10".to_string()),
                    payment_status: Some("refunded".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn update_into_an_inverted_range_is_a_validation_error() {
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_update().returning(|_, _| {
            Err(LifecycleError::InvalidDateRange {
                start: date("2024-03-01"),
                end: date("2024-01-31"),
            })
        });

        let err = usecase(repo, MockClock::new())
            .update(
                &owner(),
                Uuid::new_v4(),
                UpdateSubscriptionPeriodRequest {
                    start_date: Some("2024-03-01".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn cancel_stamps_the_clock_time() {
        let period_id = Uuid::new_v4();
        let clock = clock_at("2024-01-10");
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap();

        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_cancel()
            .with(eq(period_id), eq(now))
            .times(2)
            .returning(move |_, now| {
                let mut period = sample_period(Uuid::new_v4(), "2024-01-01", "2024-01-31");
                period.cancelled_at = Some(now);
                Ok(period)
            });

        let uc = usecase(repo, clock);
        assert_eq!(uc.cancel(&owner(), period_id).await.unwrap(), 1);
        assert_eq!(uc.cancel(&owner(), period_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn cancel_unknown_period_is_not_found() {
        let period_id = Uuid::new_v4();
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_cancel()
            .returning(move |_, _| Err(LifecycleError::PeriodNotFound(period_id)));

        let err = usecase(repo, clock_at("2024-01-10"))
            .cancel(&owner(), period_id)
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionPeriodError::NotFound(_)));
    }

    #[tokio::test]
    async fn restore_reports_overlap_without_failing() {
        let period_id = Uuid::new_v4();
        let overlapping_period_id = Uuid::new_v4();

        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_restore()
            .with(eq(period_id))
            .returning(move |_| {
                Ok(RestoreOutcome {
                    period: sample_period(Uuid::new_v4(), "2024-01-01", "2024-01-31"),
                    overlapping_period_id: Some(overlapping_period_id),
                })
            });

        let response = usecase(repo, MockClock::new())
            .restore(&owner(), period_id)
            .await
            .unwrap();

        assert_eq!(response.affected, 1);
        assert_eq!(response.overlapping_period_id, Some(overlapping_period_id));
    }

    #[tokio::test]
    async fn pause_uses_the_local_calendar_day() {
        let period_id = Uuid::new_v4();
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_pause()
            .with(eq(period_id), eq(date("2024-01-10")))
            .returning(|_, today| {
                let mut period = sample_period(Uuid::new_v4(), "2024-01-01", "2024-01-31");
                period.paused_at = Some(today);
                Ok(period)
            });

        let affected = usecase(repo, clock_at("2024-01-10"))
            .pause(&owner(), period_id)
            .await
            .unwrap();

        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn pause_of_a_paused_period_is_a_conflict() {
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_pause()
            .returning(|_, _| Err(LifecycleError::Conflict(ConflictReason::AlreadyPaused)));

        let err = usecase(repo, clock_at("2024-01-10"))
            .pause(&owner(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "subscription period is already paused");
        assert_eq!(err.status_code().as_u16(), 409);
    }

    #[tokio::test]
    async fn resume_returns_added_days() {
        let period_id = Uuid::new_v4();
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_resume()
            .with(eq(period_id), eq(date("2024-02-09")))
            .returning(|_, _| {
                Ok(ResumeOutcome {
                    period: sample_period(Uuid::new_v4(), "2024-01-01", "2024-03-01"),
                    added_days: 30,
                    overlapping_period_id: None,
                })
            });

        let response = usecase(repo, clock_at("2024-02-09"))
            .resume(&owner(), period_id)
            .await
            .unwrap();

        assert_eq!(response.affected, 1);
        assert_eq!(response.added_days, 30);
        assert_eq!(response.overlapping_period_id, None);
    }

    #[tokio::test]
    async fn resume_into_the_next_period_reports_the_overlap() {
        let member_id = Uuid::new_v4();
        let period_id = Uuid::new_v4();
        let february_id = Uuid::new_v4();

        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_resume()
            .with(eq(period_id), eq(date("2024-01-20")))
            .returning(move |_, _| {
                Ok(ResumeOutcome {
                    period: sample_period(member_id, "2024-01-01", "2024-02-10"),
                    added_days: 10,
                    overlapping_period_id: Some(february_id),
                })
            });

        let response = usecase(repo, clock_at("2024-01-20"))
            .resume(&owner(), period_id)
            .await
            .unwrap();

        assert_eq!(response.added_days, 10);
        assert_eq!(response.overlapping_period_id, Some(february_id));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["overlapping_period_id"], february_id.to_string());
    }

    #[tokio::test]
    async fn resume_without_pause_is_a_conflict() {
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_resume()
            .returning(|_, _| Err(LifecycleError::Conflict(ConflictReason::NotPaused)));

        let err = usecase(repo, clock_at("2024-02-09"))
            .resume(&owner(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionPeriodError::Conflict(_)));
    }

    #[tokio::test]
    async fn store_failures_surface_as_internal() {
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_delete_hard()
            .returning(|_| Err(LifecycleError::Store(anyhow::anyhow!("connection reset"))));

        let err = usecase(repo, MockClock::new())
            .delete_hard(&owner(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert_eq!(err.status_code().as_u16(), 500);
    }

    #[tokio::test]
    async fn get_projects_status_at_read_time() {
        let period_id = Uuid::new_v4();
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_find_by_id().with(eq(period_id)).returning(|_| {
            let mut period = sample_period(Uuid::new_v4(), "2024-01-01", "2024-01-31");
            period.paused_at = Some(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
            Ok(Some(period))
        });

        let row = usecase(repo, clock_at("2024-03-01"))
            .get(&owner(), period_id)
            .await
            .unwrap();

        assert_eq!(row.status, PeriodStatus::Paused);
    }

    #[tokio::test]
    async fn get_missing_period_is_not_found() {
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = usecase(repo, MockClock::new())
            .get(&owner(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert_eq!(err.status_code().as_u16(), 404);
    }

    #[tokio::test]
    async fn list_pushes_status_and_limit_down_to_the_store() {
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_list()
            .with(eq(ListSubscriptionPeriodsFilter {
                member_id: None,
                status: Some(PeriodStatus::Canceled),
                today: date("2024-03-05"),
                limit: 1,
            }))
            .times(1)
            .returning(|_| {
                let mut period = sample_period(Uuid::new_v4(), "2024-02-01", "2024-02-29");
                period.cancelled_at = Some(Utc.with_ymd_and_hms(2024, 2, 3, 8, 0, 0).unwrap());
                Ok(vec![period])
            });

        let rows = usecase(repo, clock_at("2024-03-05"))
            .list(
                &owner(),
                ListSubscriptionPeriodsQuery {
                    member_id: None,
                    status: Some("canceled".to_string()),
                    limit: Some(1),
                },
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, PeriodStatus::Canceled);
    }

    #[tokio::test]
    async fn list_drops_rows_whose_projection_disagrees_with_the_filter() {
        let member_id = Uuid::new_v4();
        let mut repo = MockSubscriptionPeriodRepository::new();
        repo.expect_list()
            .with(eq(ListSubscriptionPeriodsFilter {
                member_id: Some(member_id),
                status: Some(PeriodStatus::Expired),
                today: date("2024-03-05"),
                limit: 2,
            }))
            .returning(move |_| {
                Ok(vec![
                    sample_period(member_id, "2024-03-01", "2024-03-31"),
                    sample_period(member_id, "2024-02-01", "2024-02-29"),
                ])
            });

        let rows = usecase(repo, clock_at("2024-03-05"))
            .list(
                &owner(),
                ListSubscriptionPeriodsQuery {
                    member_id: Some(member_id),
                    status: Some("expired".to_string()),
                    limit: Some(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start_date, date("2024-02-01"));
        assert_eq!(rows[0].status, PeriodStatus::Expired);
    }

    #[tokio::test]
    async fn list_rejects_unknown_status_and_bad_limit() {
        let uc = usecase(MockSubscriptionPeriodRepository::new(), clock_at("2024-03-05"));

        for query in [
            ListSubscriptionPeriodsQuery {
                status: Some("frozen".to_string()),
                ..Default::default()
            },
            ListSubscriptionPeriodsQuery {
                limit: Some(0),
                ..Default::default()
            },
            ListSubscriptionPeriodsQuery {
                limit: Some(MAX_LIST_LIMIT + 1),
                ..Default::default()
            },
        ] {
            let err = uc.list(&owner(), query).await.unwrap_err();
            assert!(matches!(err, SubscriptionPeriodError::Validation(_)));
        }
    }

    #[test]
    fn list_defaults_to_the_standard_limit() {
        let filter = validate_list_query(ListSubscriptionPeriodsQuery::default(), date("2024-03-05"))
            .unwrap();

        assert_eq!(filter.limit, DEFAULT_LIST_LIMIT);
        assert_eq!(filter.status, None);
        assert_eq!(filter.today, date("2024-03-05"));
    }
}
