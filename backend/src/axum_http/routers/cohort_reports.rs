use crate::{
    auth::AuthStaff,
    config::config_model::DotEnvyConfig,
    usecases::cohort_reports::{CohortReportError, CohortReportQuery, CohortReportUseCase},
};
use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::WithRejection;
use membership_core::{
    domain::repositories::cohort_reports::CohortReportRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::cohort_reports::CohortReportPostgres,
    },
};
use std::sync::Arc;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let cohort_report_repository = CohortReportPostgres::new(Arc::clone(&db_pool));
    let usecase = CohortReportUseCase::new(
        Arc::new(cohort_report_repository),
        config.analytics.cohort_max_months,
    );

    Router::new()
        .route("/subscription-cohorts", get(subscription_cohorts))
        .with_state(Arc::new(usecase))
}

pub async fn subscription_cohorts<R>(
    State(usecase): State<Arc<CohortReportUseCase<R>>>,
    staff: AuthStaff,
    WithRejection(Query(query), _): WithRejection<Query<CohortReportQuery>, CohortReportError>,
) -> impl IntoResponse
where
    R: CohortReportRepository + Send + Sync + 'static,
{
    match usecase.report(&staff, query).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => err.into_response(),
    }
}
