use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Failures of a lifecycle write. Every variant aborts the surrounding
/// transaction, so a caller never observes a partially applied change.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("member {0} not found")]
    MemberNotFound(Uuid),
    #[error("subscription period {0} not found")]
    PeriodNotFound(Uuid),
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("{0}")]
    Conflict(ConflictReason),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictReason {
    #[error("date range overlaps active subscription period {existing_period_id}")]
    Overlap { existing_period_id: Uuid },
    #[error("subscription period is already paused")]
    AlreadyPaused,
    #[error("a canceled subscription period cannot be paused")]
    PauseCanceled,
    #[error("subscription period is not paused")]
    NotPaused,
}

impl From<diesel::result::Error> for LifecycleError {
    fn from(err: diesel::result::Error) -> Self {
        LifecycleError::Store(err.into())
    }
}

pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diesel_errors_become_store_errors() {
        let err: LifecycleError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, LifecycleError::Store(_)));
    }

    #[test]
    fn conflict_message_names_the_overlapping_period() {
        let existing_period_id = Uuid::nil();
        let err = LifecycleError::Conflict(ConflictReason::Overlap { existing_period_id });
        assert_eq!(
            err.to_string(),
            format!("date range overlaps active subscription period {existing_period_id}")
        );
    }

    #[test]
    fn conflict_reasons_read_as_plain_messages() {
        assert_eq!(
            ConflictReason::PauseCanceled.to_string(),
            "a canceled subscription period cannot be paused"
        );
        assert_eq!(
            LifecycleError::Conflict(ConflictReason::NotPaused).to_string(),
            "subscription period is not paused"
        );
    }
}
