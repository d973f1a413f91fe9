use crate::data_sync::ergast::{ErgastConstructorStanding, ErgastDriverStanding, ErgastStandingsList};
use crate::error::Result;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::records::{NewSeason, NewStanding};
use crate::store::{resolver, upsert};
use crate::utils::parse::{non_empty, parse_float, parse_int};
use sqlx::SqliteConnection;
use tracing::{info, warn};

/// Standings after the latest round. Pages split by row, so one round can arrive as several lists.
fn latest(lists: Vec<ErgastStandingsList>) -> Option<ErgastStandingsList> {
    let round_of = |list: &ErgastStandingsList| list.round.as_deref().and_then(parse_int).unwrap_or(0);
    let last_round = lists.iter().map(round_of).max()?;

    let mut pages = lists.into_iter().filter(|list| round_of(list) == last_round);
    let mut merged = pages.next()?;
    for page in pages {
        merged.driver_standings.extend(page.driver_standings);
        merged.constructor_standings.extend(page.constructor_standings);
    }
    Some(merged)
}

impl Synchronizer {
    /// Driver and constructor standings per season. Podiums are counted from stored results.
    pub async fn sync_standings(&self, year: Option<i64>) -> Result<SyncReport> {
        let years = self.target_years(year).await?;
        let mut report = SyncReport::default();

        for year in years {
            let outcome = self.sync_standing_season(year).await;
            self.settle_season("Standings", year, outcome, &mut report)?;
        }

        info!("Standings: {}", report);
        Ok(report)
    }

    pub async fn sync_standing_season(&self, year: i64) -> Result<SyncReport> {
        let api = self.ergast();
        let drivers = latest(api.driver_standings(year).collect_all().await?);
        let constructors = latest(api.constructor_standings(year).collect_all().await?);

        let mut report = SyncReport::default();
        let mut tx = self.database().begin().await?;
        let season_id = upsert(&mut tx, &NewSeason { year }).await?.into_key();

        for standing in drivers.iter().flat_map(|list| &list.driver_standings) {
            self.sync_driver_standing(&mut tx, season_id, standing, &mut report).await?;
        }
        for standing in constructors.iter().flat_map(|list| &list.constructor_standings) {
            self.sync_constructor_standing(&mut tx, season_id, standing, &mut report).await?;
        }
        tx.commit().await?;

        Ok(report)
    }

    async fn sync_driver_standing(
        &self,
        conn: &mut SqliteConnection,
        season_id: i64,
        standing: &ErgastDriverStanding,
        report: &mut SyncReport,
    ) -> Result<()> {
        let driver = &standing.driver;
        let code = non_empty(driver.code.as_deref());
        let Some(driver_id) =
            resolver::driver(&mut *conn, Some(&driver.driver_id), &driver.given_name, &driver.family_name, code.as_deref()).await?
        else {
            warn!("Standing for unknown driver {}", driver.driver_id);
            report.skip();
            return Ok(());
        };

        let team_id = match standing.constructors.last() {
            Some(constructor) => resolver::team(&mut *conn, Some(&constructor.constructor_id), &constructor.name).await?,
            None => None,
        };

        let record = NewStanding {
            season_id,
            driver_id: Some(driver_id),
            team_id,
            points: parse_float(&standing.points).unwrap_or(0.0),
            position: standing.position.as_deref().and_then(parse_int),
            victories: parse_int(&standing.wins).unwrap_or(0),
            podiums: resolver::driver_podiums(&mut *conn, season_id, driver_id).await?,
        };
        report.record(&upsert(conn, &record).await?);
        Ok(())
    }

    async fn sync_constructor_standing(
        &self,
        conn: &mut SqliteConnection,
        season_id: i64,
        standing: &ErgastConstructorStanding,
        report: &mut SyncReport,
    ) -> Result<()> {
        let constructor = &standing.constructor;
        let Some(team_id) = resolver::team(&mut *conn, Some(&constructor.constructor_id), &constructor.name).await? else {
            warn!("Standing for unknown constructor {}", constructor.constructor_id);
            report.skip();
            return Ok(());
        };

        let record = NewStanding {
            season_id,
            driver_id: None,
            team_id: Some(team_id),
            points: parse_float(&standing.points).unwrap_or(0.0),
            position: standing.position.as_deref().and_then(parse_int),
            victories: parse_int(&standing.wins).unwrap_or(0),
            podiums: resolver::team_podiums(&mut *conn, season_id, team_id).await?,
        };
        report.record(&upsert(conn, &record).await?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_latest_list_wins() {
        let lists: Vec<ErgastStandingsList> = serde_json::from_value(json!([
            {"season": "2023", "round": "21", "DriverStandings": []},
            {"season": "2023", "round": "22", "DriverStandings": []},
            {"season": "2023", "round": "3", "DriverStandings": []}
        ]))
        .unwrap();
        assert_eq!(latest(lists).and_then(|l| l.round).as_deref(), Some("22"));
        assert!(latest(Vec::new()).is_none());
    }

    #[test]
    fn test_split_round_is_concatenated() {
        let driver = |id: &str| json!({"points": "0", "wins": "0", "Driver": {"driverId": id, "givenName": "G", "familyName": id}});
        let lists: Vec<ErgastStandingsList> = serde_json::from_value(json!([
            {"season": "1985", "round": "16", "DriverStandings": [driver("prost"), driver("alboreto")]},
            {"season": "1985", "round": "16", "DriverStandings": [driver("rosberg")]},
            {"season": "1985", "round": "15", "DriverStandings": [driver("senna")]}
        ]))
        .unwrap();

        let merged = latest(lists).unwrap();
        let ids: Vec<&str> = merged.driver_standings.iter().map(|s| s.driver.driver_id.as_str()).collect();
        assert_eq!(ids, vec!["prost", "alboreto", "rosberg"]);
    }
}
