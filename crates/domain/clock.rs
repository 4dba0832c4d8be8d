use chrono::{DateTime, Local, NaiveDate, Utc};
use mockall::automock;

/// Source of "now" for lifecycle decisions. Date-only comparisons (pause,
/// resume, expiry) use the server's local calendar day.
#[automock]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
