use crate::error::Result;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::Table;
use std::time::Instant;
use tracing::info;

impl Synchronizer {
    /// Every routine in dependency order. A failing stage stops the run; earlier stages stay committed.
    pub async fn run_all(&self) -> Result<Vec<(Table, SyncReport)>> {
        let started = Instant::now();
        let mut reports = Vec::with_capacity(9);

        reports.push((Table::Country, self.sync_countries().await?));
        reports.push((Table::Season, self.sync_seasons().await?));
        reports.push((Table::Status, self.sync_statuses().await?));
        reports.push((Table::Track, self.sync_tracks().await?));
        reports.push((Table::Team, self.sync_teams(None).await?));
        reports.push((Table::Driver, self.sync_drivers().await?));
        reports.push((Table::Race, self.sync_races(None).await?));
        reports.push((Table::Standing, self.sync_standings(None).await?));
        reports.push((Table::PitStop, self.sync_pit_stops(None).await?));

        self.log_row_counts().await?;
        info!("Full sync finished in {:.1}s", started.elapsed().as_secs_f64());
        Ok(reports)
    }

    pub async fn log_row_counts(&self) -> Result<()> {
        for (table, rows) in self.database().row_counts().await? {
            info!("{:>10}: {} rows", table, rows);
        }
        Ok(())
    }
}
