use crate::constants::StatusLabel;
use crate::error::Result;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::records::NewStatus;
use crate::store::resolver::StatusKind;
use crate::store::upsert;
use tracing::info;

pub const RACE_STATUSES: [&str; 3] = [StatusLabel::SCHEDULED, StatusLabel::COMPLETED, StatusLabel::CANCELLED];
pub const DRIVER_STATUSES: [&str; 3] = [StatusLabel::RETIRED, StatusLabel::LAPPED, StatusLabel::FINISHED];

impl Synchronizer {
    /// Seed the fixed status labels. Driver statuses reported by results are added on the fly by the race sync.
    pub async fn sync_statuses(&self) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let mut tx = self.database().begin().await?;

        let seeds = RACE_STATUSES
            .iter()
            .map(|label| NewStatus::new(*label, StatusKind::Race))
            .chain(DRIVER_STATUSES.iter().map(|label| NewStatus::new(*label, StatusKind::Driver)));
        for status in seeds {
            report.record(&upsert(&mut tx, &status).await?);
        }
        tx.commit().await?;

        info!("Statuses: {}", report);
        Ok(report)
    }
}
