use crate::constants::FIRST_PIT_STOP_SEASON;
use crate::error::Result;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::models::Race;
use crate::store::records::NewPitStop;
use crate::store::{resolver, upsert};
use crate::utils::parse::{parse_int, parse_lap_time, parse_time};
use tracing::{debug, info, warn};

impl Synchronizer {
    /// Pit stops of every stored race of a season. Seasons before the API's coverage are skipped.
    pub async fn sync_pit_stops(&self, year: Option<i64>) -> Result<SyncReport> {
        let years = self.target_years(year).await?;
        let mut report = SyncReport::default();

        for year in years {
            if year < FIRST_PIT_STOP_SEASON {
                debug!("No pit stop data before {}, skipping {}", FIRST_PIT_STOP_SEASON, year);
                continue;
            }
            let outcome = self.sync_pit_stop_season(year).await;
            self.settle_season("Pit stops", year, outcome, &mut report)?;
        }

        info!("Pit stops: {}", report);
        Ok(report)
    }

    pub async fn sync_pit_stop_season(&self, year: i64) -> Result<SyncReport> {
        let races: Vec<Race> = {
            let mut conn = self.database().pool().acquire().await?;
            match resolver::season_by_year(&mut conn, year).await? {
                Some(season_id) => resolver::races_of_season(&mut conn, season_id).await?,
                None => Vec::new(),
            }
        };
        if races.is_empty() {
            warn!("No races stored for {}; sync races first", year);
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();
        let mut tx = self.database().begin().await?;
        for race in &races {
            let payload = self.ergast().pit_stops(year, race.round).collect_all().await?;

            for stop in payload.iter().flat_map(|r| &r.pit_stops) {
                let Some(driver_id) = resolver::driver_by_ref(&mut tx, &stop.driver_id).await? else {
                    warn!("Pit stop for unknown driver {} in {}", stop.driver_id, race.name);
                    report.skip();
                    continue;
                };
                let (Some(lap), Some(number)) = (parse_int(&stop.lap), parse_int(&stop.stop)) else {
                    report.skip();
                    continue;
                };

                let record = NewPitStop {
                    race_id: race.id,
                    driver_id,
                    lap,
                    stop: number,
                    stop_time: parse_time(&stop.time).map(|t| race.race_date.date().and_time(t)),
                    duration: parse_lap_time(&stop.duration),
                };
                report.record(&upsert(&mut tx, &record).await?);
            }
        }
        tx.commit().await?;

        Ok(report)
    }
}
