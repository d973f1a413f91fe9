use crate::error::Result;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::records::NewSeason;
use crate::store::upsert;
use crate::utils::parse::parse_int;
use tracing::{info, warn};

impl Synchronizer {
    pub async fn sync_seasons(&self) -> Result<SyncReport> {
        info!("Syncing seasons");
        let seasons = self.ergast().seasons().collect_all().await?;

        let mut report = SyncReport::default();
        let mut tx = self.database().begin().await?;
        for season in &seasons {
            let Some(year) = parse_int(&season.season) else {
                warn!("Skipping season with unreadable year {:?}", season.season);
                report.skip();
                continue;
            };
            report.record(&upsert(&mut tx, &NewSeason { year }).await?);
        }
        tx.commit().await?;

        info!("Seasons: {}", report);
        Ok(report)
    }
}
