pub mod cohort_reports;
pub mod subscription_periods;
