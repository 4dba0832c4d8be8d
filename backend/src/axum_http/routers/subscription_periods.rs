use crate::{
    auth::AuthStaff,
    usecases::subscription_periods::{SubscriptionPeriodError, SubscriptionPeriodUseCase},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use membership_core::{
    domain::{
        clock::{Clock, SystemClock},
        repositories::subscription_periods::SubscriptionPeriodRepository,
        value_objects::subscription_periods::{
            AffectedResponse, CreateSubscriptionPeriodRequest, CreatedPeriodResponse,
            ListSubscriptionPeriodsQuery, UpdateSubscriptionPeriodRequest,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::subscription_periods::SubscriptionPeriodPostgres,
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_period_repository = SubscriptionPeriodPostgres::new(Arc::clone(&db_pool));
    let usecase = SubscriptionPeriodUseCase::new(
        Arc::new(subscription_period_repository),
        Arc::new(SystemClock),
    );

    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one).patch(update).delete(delete_hard))
        .route("/:id/cancel", post(cancel))
        .route("/:id/restore", post(restore))
        .route("/:id/pause", post(pause))
        .route("/:id/resume", post(resume))
        .with_state(Arc::new(usecase))
}

pub async fn create<S, C>(
    State(usecase): State<Arc<SubscriptionPeriodUseCase<S, C>>>,
    staff: AuthStaff,
    WithRejection(Json(request), _): WithRejection<
        Json<CreateSubscriptionPeriodRequest>,
        SubscriptionPeriodError,
    >,
) -> impl IntoResponse
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    info!(staff_id = %staff.staff_id, "subscription_periods: create request received");
    match usecase.create(&staff, request).await {
        Ok(id) => (StatusCode::CREATED, Json(CreatedPeriodResponse { id })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list<S, C>(
    State(usecase): State<Arc<SubscriptionPeriodUseCase<S, C>>>,
    staff: AuthStaff,
    WithRejection(Query(query), _): WithRejection<
        Query<ListSubscriptionPeriodsQuery>,
        SubscriptionPeriodError,
    >,
) -> impl IntoResponse
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    match usecase.list(&staff, query).await {
        Ok(rows) => Json(rows).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_one<S, C>(
    State(usecase): State<Arc<SubscriptionPeriodUseCase<S, C>>>,
    staff: AuthStaff,
    WithRejection(Path(period_id), _): WithRejection<Path<Uuid>, SubscriptionPeriodError>,
) -> impl IntoResponse
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    match usecase.get(&staff, period_id).await {
        Ok(row) => Json(row).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update<S, C>(
    State(usecase): State<Arc<SubscriptionPeriodUseCase<S, C>>>,
    staff: AuthStaff,
    WithRejection(Path(period_id), _): WithRejection<Path<Uuid>, SubscriptionPeriodError>,
    WithRejection(Json(request), _): WithRejection<
        Json<UpdateSubscriptionPeriodRequest>,
        SubscriptionPeriodError,
    >,
) -> impl IntoResponse
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    info!(staff_id = %staff.staff_id, %period_id, "subscription_periods: update request received");
    match usecase.update(&staff, period_id, request).await {
        Ok(affected) => Json(AffectedResponse { affected }).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn cancel<S, C>(
    State(usecase): State<Arc<SubscriptionPeriodUseCase<S, C>>>,
    staff: AuthStaff,
    WithRejection(Path(period_id), _): WithRejection<Path<Uuid>, SubscriptionPeriodError>,
) -> impl IntoResponse
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    match usecase.cancel(&staff, period_id).await {
        Ok(affected) => Json(AffectedResponse { affected }).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn restore<S, C>(
    State(usecase): State<Arc<SubscriptionPeriodUseCase<S, C>>>,
    staff: AuthStaff,
    WithRejection(Path(period_id), _): WithRejection<Path<Uuid>, SubscriptionPeriodError>,
) -> impl IntoResponse
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    match usecase.restore(&staff, period_id).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn pause<S, C>(
    State(usecase): State<Arc<SubscriptionPeriodUseCase<S, C>>>,
    staff: AuthStaff,
    WithRejection(Path(period_id), _): WithRejection<Path<Uuid>, SubscriptionPeriodError>,
) -> impl IntoResponse
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    match usecase.pause(&staff, period_id).await {
        Ok(affected) => Json(AffectedResponse { affected }).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn resume<S, C>(
    State(usecase): State<Arc<SubscriptionPeriodUseCase<S, C>>>,
    staff: AuthStaff,
    WithRejection(Path(period_id), _): WithRejection<Path<Uuid>, SubscriptionPeriodError>,
) -> impl IntoResponse
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    match usecase.resume(&staff, period_id).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn delete_hard<S, C>(
    State(usecase): State<Arc<SubscriptionPeriodUseCase<S, C>>>,
    staff: AuthStaff,
    WithRejection(Path(period_id), _): WithRejection<Path<Uuid>, SubscriptionPeriodError>,
) -> impl IntoResponse
where
    S: SubscriptionPeriodRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    info!(staff_id = %staff.staff_id, %period_id, "subscription_periods: hard delete request received");
    match usecase.delete_hard(&staff, period_id).await {
        Ok(affected) => Json(AffectedResponse { affected }).into_response(),
        Err(err) => err.into_response(),
    }
}
