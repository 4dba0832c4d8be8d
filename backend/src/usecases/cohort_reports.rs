use std::sync::Arc;

use membership_core::domain::{
    repositories::cohort_reports::CohortReportRepository,
    value_objects::{
        cohort_reports::{CohortReport, CohortWindow, build_cohort_report},
        year_months::YearMonth,
    },
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::{AuthStaff, Operation, authorize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CohortReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Error)]
pub enum CohortReportError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not allowed to read cohort reports")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CohortReportError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CohortReportError::Validation(_) => StatusCode::BAD_REQUEST,
            CohortReportError::Forbidden => StatusCode::FORBIDDEN,
            CohortReportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn parse_month(field: &str, value: Option<&str>) -> Result<YearMonth, CohortReportError> {
    let raw = value.ok_or_else(|| CohortReportError::Validation(format!("{field} is required")))?;
    YearMonth::parse(raw.trim())
        .ok_or_else(|| CohortReportError::Validation(format!("{field} must be a YYYY-MM month")))
}

pub struct CohortReportUseCase<R>
where
    R: CohortReportRepository + Send + Sync + 'static,
{
    cohort_report_repo: Arc<R>,
    max_months: usize,
}

impl<R> CohortReportUseCase<R>
where
    R: CohortReportRepository + Send + Sync + 'static,
{
    pub fn new(cohort_report_repo: Arc<R>, max_months: usize) -> Self {
        Self {
            cohort_report_repo,
            max_months,
        }
    }

    pub fn window_of(&self, query: &CohortReportQuery) -> Result<CohortWindow, CohortReportError> {
        let from = parse_month("from", query.from.as_deref())?;
        let to = parse_month("to", query.to.as_deref())?;

        let window = CohortWindow::new(from, to).ok_or_else(|| {
            CohortReportError::Validation("from must not be after to".to_string())
        })?;

        if window.month_count() > self.max_months {
            return Err(CohortReportError::Validation(format!(
                "report window must span at most {} months",
                self.max_months
            )));
        }

        Ok(window)
    }

    pub async fn report(
        &self,
        staff: &AuthStaff,
        query: CohortReportQuery,
    ) -> Result<CohortReport, CohortReportError> {
        if !authorize(staff, Operation::CohortReport) {
            warn!(
                staff_id = %staff.staff_id,
                role = ?staff.role,
                "cohort_reports: report forbidden"
            );
            return Err(CohortReportError::Forbidden);
        }

        let window = self.window_of(&query).inspect_err(|err| {
            warn!(reason = %err, "cohort_reports: invalid report window");
        })?;

        let snapshot = self
            .cohort_report_repo
            .load_snapshot(window)
            .await
            .map_err(|err| {
                error!(
                    from = %window.from(),
                    to = %window.to(),
                    db_error = ?err,
                    "cohort_reports: failed to load snapshot"
                );
                CohortReportError::Internal(err)
            })?;

        let report = build_cohort_report(&window, &snapshot);
        info!(
            staff_id = %staff.staff_id,
            from = %window.from(),
            to = %window.to(),
            months = report.labels.len(),
            periods = snapshot.periods.len(),
            "cohort_reports: report built"
        );

        Ok(report)
    }
}
