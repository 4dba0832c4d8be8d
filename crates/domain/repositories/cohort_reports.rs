use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::cohort_reports::{CohortSnapshot, CohortWindow};

#[automock]
#[async_trait]
pub trait CohortReportRepository {
    /// Periods touching `window` plus each involved member's earliest start date.
    /// Read without locks; slightly stale data is acceptable for reporting.
    async fn load_snapshot(&self, window: CohortWindow) -> Result<CohortSnapshot>;
}
