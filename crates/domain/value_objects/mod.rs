pub mod cohort_reports;
pub mod enums;
pub mod period_lifecycle;
pub mod permissions;
pub mod status_projection;
pub mod subscription_periods;
pub mod year_months;
