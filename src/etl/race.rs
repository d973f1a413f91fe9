use crate::constants::StatusLabel;
use crate::data_sync::ergast::{ErgastRace, ErgastResult, ErgastSession};
use crate::data_sync::telemetry::{SessionType, TeamEntry};
use crate::enrich::Enricher;
use crate::error::Result;
use crate::etl::driver::driver_record;
use crate::etl::team::team_record;
use crate::etl::track::track_record;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::records::{NewRace, NewResult, NewSeason, NewStatus, ResultKey, record_best_lap};
use crate::store::resolver::StatusKind;
use crate::store::upsert;
use crate::utils::parse::{parse_date_time, parse_float, parse_int, parse_lap_time};
use ahash::AHashMap;
use chrono::NaiveDateTime;
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

/// Join the calendar with the results of a season by round.
///
/// Results are paginated per result row, so a race can come back split over two pages; the
/// halves are concatenated. Rounds without results stay scheduled.
pub fn merge_rounds(schedule: Vec<ErgastRace>, results: Vec<ErgastRace>) -> Vec<ErgastRace> {
    let mut by_round: AHashMap<i64, ErgastRace> = AHashMap::new();

    for race in schedule {
        match parse_int(&race.round) {
            Some(round) => {
                by_round.insert(round, race);
            }
            None => warn!("Skipping scheduled race with unreadable round {:?}", race.round),
        }
    }

    for race in results {
        let Some(round) = parse_int(&race.round) else {
            warn!("Skipping results with unreadable round {:?}", race.round);
            continue;
        };
        match by_round.get_mut(&round) {
            Some(known) => known.results.extend(race.results),
            None => {
                by_round.insert(round, race);
            }
        }
    }

    let mut merged: Vec<(i64, ErgastRace)> = by_round.into_iter().collect();
    merged.sort_by_key(|(round, _)| *round);
    merged.into_iter().map(|(_, race)| race).collect()
}

fn session_start(session: Option<&ErgastSession>) -> Option<NaiveDateTime> {
    session.and_then(|s| parse_date_time(&s.date, s.time.as_deref()))
}

/// Numeric placement, retirements included; `positionText` only carries the classification letter.
fn finish_position(result: &ErgastResult) -> Option<i64> {
    parse_int(&result.position)
}

struct SeasonStatuses {
    scheduled: i64,
    completed: i64,
}

impl Synchronizer {
    /// Calendar, results, and everything results reference, one transaction per season.
    pub async fn sync_races(&self, year: Option<i64>) -> Result<SyncReport> {
        let years = self.target_years(year).await?;
        let mut report = SyncReport::default();

        for year in years {
            let outcome = self.sync_race_season(year).await;
            self.settle_season("Races", year, outcome, &mut report)?;
        }

        info!("Races: {}", report);
        Ok(report)
    }

    pub async fn sync_race_season(&self, year: i64) -> Result<SyncReport> {
        info!("Syncing races of {}", year);
        let api = self.ergast();
        let schedule = api.schedule(year).collect_all().await?;
        let results = api.results(year).collect_all().await?;
        let races = merge_rounds(schedule, results);

        let enricher = self.enricher();
        let mut report = SyncReport::default();
        let mut tx = self.database().begin().await?;

        let season_id = upsert(&mut tx, &NewSeason { year }).await?.into_key();
        let statuses = SeasonStatuses {
            scheduled: upsert(&mut tx, &NewStatus::new(StatusLabel::SCHEDULED, StatusKind::Race)).await?.into_key(),
            completed: upsert(&mut tx, &NewStatus::new(StatusLabel::COMPLETED, StatusKind::Race)).await?.into_key(),
        };

        for race in &races {
            self.sync_race(&mut tx, &enricher, year, season_id, &statuses, race, &mut report).await?;
        }
        tx.commit().await?;

        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    async fn sync_race(
        &self,
        conn: &mut SqliteConnection,
        enricher: &Enricher<'_>,
        year: i64,
        season_id: i64,
        statuses: &SeasonStatuses,
        race: &ErgastRace,
        report: &mut SyncReport,
    ) -> Result<()> {
        let Some(round) = parse_int(&race.round) else {
            report.skip();
            return Ok(());
        };
        let Some(race_date) = parse_date_time(&race.date, race.time.as_deref()) else {
            warn!("Skipping {} {}: unreadable date {:?}", year, race.race_name, race.date);
            report.skip();
            return Ok(());
        };

        let context = enricher.find_session(year, &race.race_name, SessionType::Race).await;
        let geometry = match &context {
            Some(context) => enricher.track_geometry(context).await,
            None => None,
        };

        let track = track_record(&mut *conn, &race.circuit, geometry.as_ref()).await?;
        let track_outcome = upsert(&mut *conn, &track).await?;
        report.record(&track_outcome);
        let track_id = track_outcome.into_key();

        let completed = !race.results.is_empty();
        let record = NewRace {
            season_id,
            track_id,
            name: race.race_name.clone(),
            race_date,
            first_practice_date: session_start(race.first_practice.as_ref()),
            second_practice_date: session_start(race.second_practice.as_ref()),
            third_practice_date: session_start(race.third_practice.as_ref()),
            qualifying_date: session_start(race.qualifying.as_ref()),
            sprint_date: session_start(race.sprint.as_ref()),
            round,
            status_id: Some(if completed { statuses.completed } else { statuses.scheduled }),
        };
        let race_outcome = upsert(&mut *conn, &record).await?;
        report.record(&race_outcome);
        let race_id = race_outcome.into_key();
        debug!("{} round {} {} -> race {}", year, round, race.race_name, race_id);

        if !completed {
            return Ok(());
        }

        let entries = match &context {
            Some(context) => enricher.team_entries(context).await,
            None => Vec::new(),
        };
        for result in &race.results {
            self.sync_result(&mut *conn, enricher, &entries, race_id, track_id, result, report).await?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn sync_result(
        &self,
        conn: &mut SqliteConnection,
        enricher: &Enricher<'_>,
        entries: &[TeamEntry],
        race_id: i64,
        track_id: i64,
        result: &ErgastResult,
        report: &mut SyncReport,
    ) -> Result<()> {
        let profile = enricher.team_profile(&result.constructor.name, entries);
        let team = team_record(&mut *conn, &result.constructor, profile).await?;
        let team_outcome = upsert(&mut *conn, &team).await?;
        report.record(&team_outcome);
        let team_id = team_outcome.into_key();

        let driver = driver_record(&mut *conn, &result.driver, Some(team_id)).await?;
        let driver_outcome = upsert(&mut *conn, &driver).await?;
        report.record(&driver_outcome);
        let driver_id = driver_outcome.into_key();

        let status_id = upsert(&mut *conn, &NewStatus::new(result.status.trim(), StatusKind::Driver)).await?.into_key();

        // pit lane starts are reported as grid 0
        let start_position = parse_int(&result.grid).unwrap_or(0);
        let best_lap_time = result.fastest_lap_time().and_then(parse_lap_time);

        let record = NewResult {
            key: ResultKey { race_id, driver_id, team_id },
            start_position,
            finish_position: finish_position(result),
            best_lap_time,
            points: parse_float(&result.points).unwrap_or(0.0),
            status_id: Some(status_id),
        };
        report.record(&upsert(&mut *conn, &record).await?);

        if let Some(lap) = best_lap_time {
            if record_best_lap(&mut *conn, track_id, lap, driver_id).await? {
                debug!("New best lap {:.3}s on track {}", lap, track_id);
            }
        }
        Ok(())
    }
}
