use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::usecases::{
    cohort_reports::CohortReportError, subscription_periods::SubscriptionPeriodError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

fn error_body(status: StatusCode, message: String) -> Response {
    let body = Json(ErrorResponse {
        code: status.as_u16(),
        message,
    });

    (status, body).into_response()
}

impl IntoResponse for SubscriptionPeriodError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            // Store details stay in the logs.
            SubscriptionPeriodError::Internal(_) => "Internal server error".to_string(),
            SubscriptionPeriodError::Validation(msg)
            | SubscriptionPeriodError::NotFound(msg)
            | SubscriptionPeriodError::Conflict(msg) => msg,
            other => other.to_string(),
        };

        error_body(status, message)
    }
}

// Extractor rejections share the validation body with every other malformed input.
impl From<JsonRejection> for SubscriptionPeriodError {
    fn from(rejection: JsonRejection) -> Self {
        SubscriptionPeriodError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for SubscriptionPeriodError {
    fn from(rejection: PathRejection) -> Self {
        SubscriptionPeriodError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for SubscriptionPeriodError {
    fn from(rejection: QueryRejection) -> Self {
        SubscriptionPeriodError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for CohortReportError {
    fn from(rejection: QueryRejection) -> Self {
        CohortReportError::Validation(rejection.body_text())
    }
}

impl IntoResponse for CohortReportError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            CohortReportError::Internal(_) => "Internal server error".to_string(),
            CohortReportError::Validation(msg) => msg,
            other => other.to_string(),
        };

        error_body(status, message)
    }
}
