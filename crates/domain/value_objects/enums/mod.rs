pub mod payment_statuses;
pub mod period_statuses;
