//! Insertable records, one per entity.
//!
//! Optional enrichment fields use `COALESCE` on update: passing `None` keeps what is stored.
use crate::constants::DEFAULT_TEAM_COLOR;
use crate::error::Result;
use crate::store::resolver::{self, StatusKind};
use crate::store::upsert::Upsert;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqliteConnection;

#[derive(Debug, Clone)]
pub struct NewCountry {
    pub name: String,
    pub iso_code: String,
    pub flag_url: Option<String>,
    pub timezone: Option<String>,
    pub alt_spellings: Option<String>,
    pub female_demonym: Option<String>,
    pub male_demonym: Option<String>,
}

#[async_trait]
impl Upsert for NewCountry {
    type Key = i64;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        resolver::country_by_iso(conn, &self.iso_code).await
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let done = sqlx::query(
            "INSERT INTO country (name, iso_code, flag_url, timezone, alt_spellings, female_demonym, male_demonym) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&self.name)
        .bind(&self.iso_code)
        .bind(self.flag_url.as_deref())
        .bind(self.timezone.as_deref())
        .bind(self.alt_spellings.as_deref())
        .bind(self.female_demonym.as_deref())
        .bind(self.male_demonym.as_deref())
        .execute(conn)
        .await?;
        Ok(done.last_insert_rowid())
    }

    async fn update(&self, conn: &mut SqliteConnection, id: &i64) -> Result<()> {
        sqlx::query(
            "UPDATE country SET name = ?, flag_url = ?, timezone = ?, alt_spellings = ?, \
             female_demonym = ?, male_demonym = ? WHERE id = ?",
        )
        .bind(&self.name)
        .bind(self.flag_url.as_deref())
        .bind(self.timezone.as_deref())
        .bind(self.alt_spellings.as_deref())
        .bind(self.female_demonym.as_deref())
        .bind(self.male_demonym.as_deref())
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewSeason {
    pub year: i64,
}

#[async_trait]
impl Upsert for NewSeason {
    type Key = i64;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        resolver::season_by_year(conn, self.year).await
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let done = sqlx::query("INSERT INTO season (year) VALUES (?)").bind(self.year).execute(conn).await?;
        Ok(done.last_insert_rowid())
    }

    /// The year is the whole row.
    async fn update(&self, _conn: &mut SqliteConnection, _id: &i64) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewStatus {
    pub label: String,
    pub kind: StatusKind,
}

impl NewStatus {
    pub fn new(label: impl Into<String>, kind: StatusKind) -> Self {
        Self { label: label.into(), kind }
    }
}

#[async_trait]
impl Upsert for NewStatus {
    type Key = i64;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        resolver::status_by_label(conn, &self.label, self.kind).await
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let done = sqlx::query("INSERT INTO status (label, is_race_status, is_driver_status) VALUES (?, ?, ?)")
            .bind(&self.label)
            .bind(self.kind == StatusKind::Race)
            .bind(self.kind == StatusKind::Driver)
            .execute(conn)
            .await?;
        Ok(done.last_insert_rowid())
    }

    async fn update(&self, _conn: &mut SqliteConnection, _id: &i64) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTrack {
    pub name: String,
    pub city: String,
    pub country_id: Option<i64>,
    pub turns_number: Option<i64>,
    pub timezone: Option<String>,
    pub geojson_data: Option<String>,
    pub corners: Option<String>,
}

#[async_trait]
impl Upsert for NewTrack {
    type Key = i64;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        resolver::track_by_key(conn, &self.name, &self.city, self.country_id).await
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let done = sqlx::query(
            "INSERT INTO track (name, city, country_id, turns_number, timezone, geojson_data, corners) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&self.name)
        .bind(&self.city)
        .bind(self.country_id)
        .bind(self.turns_number.unwrap_or(0))
        .bind(self.timezone.as_deref())
        .bind(self.geojson_data.as_deref().unwrap_or("{}"))
        .bind(self.corners.as_deref().unwrap_or("[]"))
        .execute(conn)
        .await?;
        Ok(done.last_insert_rowid())
    }

    async fn update(&self, conn: &mut SqliteConnection, id: &i64) -> Result<()> {
        sqlx::query(
            "UPDATE track SET country_id = COALESCE(?, country_id), turns_number = COALESCE(?, turns_number), \
             timezone = COALESCE(?, timezone), geojson_data = COALESCE(?, geojson_data), corners = COALESCE(?, corners) \
             WHERE id = ?",
        )
        .bind(self.country_id)
        .bind(self.turns_number)
        .bind(self.timezone.as_deref())
        .bind(self.geojson_data.as_deref())
        .bind(self.corners.as_deref())
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

/// Keep the fastest lap ever driven on a track. Returns whether the record changed.
pub async fn record_best_lap(conn: &mut SqliteConnection, track_id: i64, lap_seconds: f64, driver_id: i64) -> Result<bool> {
    if lap_seconds <= 0.0 {
        return Ok(false);
    }

    let done = sqlx::query(
        "UPDATE track SET best_lap = ?, best_lap_driver = ? \
         WHERE id = ? AND (best_lap IS NULL OR best_lap <= 0 OR best_lap > ?)",
    )
    .bind(lap_seconds)
    .bind(driver_id)
    .bind(track_id)
    .bind(lap_seconds)
    .execute(conn)
    .await?;
    Ok(done.rows_affected() > 0)
}

#[derive(Debug, Clone, Default)]
pub struct NewTeam {
    pub name: String,
    pub external_ref: Option<String>,
    pub country_id: Option<i64>,
    pub team_manager: Option<String>,
    pub is_engine_constructor: Option<bool>,
    pub engine_constructor: Option<String>,
    pub main_color: Option<String>,
}

#[async_trait]
impl Upsert for NewTeam {
    type Key = i64;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        resolver::team(conn, self.external_ref.as_deref(), &self.name).await
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let done = sqlx::query(
            "INSERT INTO team (name, external_ref, country_id, team_manager, is_engine_constructor, engine_constructor, main_color) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&self.name)
        .bind(self.external_ref.as_deref())
        .bind(self.country_id)
        .bind(self.team_manager.as_deref())
        .bind(self.is_engine_constructor.unwrap_or(false))
        .bind(self.engine_constructor.as_deref())
        .bind(self.main_color.as_deref().unwrap_or(DEFAULT_TEAM_COLOR))
        .execute(conn)
        .await?;
        Ok(done.last_insert_rowid())
    }

    async fn update(&self, conn: &mut SqliteConnection, id: &i64) -> Result<()> {
        sqlx::query(
            "UPDATE team SET external_ref = COALESCE(external_ref, ?), country_id = COALESCE(?, country_id), \
             team_manager = COALESCE(?, team_manager), is_engine_constructor = COALESCE(?, is_engine_constructor), \
             engine_constructor = COALESCE(?, engine_constructor), main_color = COALESCE(?, main_color) \
             WHERE id = ?",
        )
        .bind(self.external_ref.as_deref())
        .bind(self.country_id)
        .bind(self.team_manager.as_deref())
        .bind(self.is_engine_constructor)
        .bind(self.engine_constructor.as_deref())
        .bind(self.main_color.as_deref())
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewDriver {
    pub first_name: String,
    pub last_name: String,
    pub code_name: Option<String>,
    pub external_ref: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_country: Option<i64>,
    pub grid_number: Option<i64>,
    pub team_id: Option<i64>,
}

impl NewDriver {
    pub fn named(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self { first_name: first_name.into(), last_name: last_name.into(), ..Default::default() }
    }

    pub fn with_code(mut self, code: Option<&str>) -> Self {
        self.code_name = code.map(str::to_string);
        self
    }

    pub fn with_ref(mut self, external_ref: Option<&str>) -> Self {
        self.external_ref = external_ref.map(str::to_string);
        self
    }
}

#[async_trait]
impl Upsert for NewDriver {
    type Key = i64;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        resolver::driver(conn, self.external_ref.as_deref(), &self.first_name, &self.last_name, self.code_name.as_deref()).await
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let done = sqlx::query(
            "INSERT INTO driver (first_name, last_name, code_name, external_ref, birth_date, birth_country, grid_number, team_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.code_name.as_deref())
        .bind(self.external_ref.as_deref())
        .bind(self.birth_date)
        .bind(self.birth_country)
        .bind(self.grid_number)
        .bind(self.team_id)
        .execute(conn)
        .await?;
        Ok(done.last_insert_rowid())
    }

    async fn update(&self, conn: &mut SqliteConnection, id: &i64) -> Result<()> {
        sqlx::query(
            "UPDATE driver SET code_name = COALESCE(?, code_name), external_ref = COALESCE(external_ref, ?), \
             birth_date = COALESCE(?, birth_date), birth_country = COALESCE(?, birth_country), \
             grid_number = COALESCE(?, grid_number), team_id = COALESCE(?, team_id) \
             WHERE id = ?",
        )
        .bind(self.code_name.as_deref())
        .bind(self.external_ref.as_deref())
        .bind(self.birth_date)
        .bind(self.birth_country)
        .bind(self.grid_number)
        .bind(self.team_id)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewRace {
    pub season_id: i64,
    pub track_id: i64,
    pub name: String,
    pub race_date: NaiveDateTime,
    pub first_practice_date: Option<NaiveDateTime>,
    pub second_practice_date: Option<NaiveDateTime>,
    pub third_practice_date: Option<NaiveDateTime>,
    pub qualifying_date: Option<NaiveDateTime>,
    pub sprint_date: Option<NaiveDateTime>,
    pub round: i64,
    pub status_id: Option<i64>,
}

#[async_trait]
impl Upsert for NewRace {
    type Key = i64;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        resolver::race_by_round(conn, self.season_id, self.round).await
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let done = sqlx::query(
            "INSERT INTO race (season_id, track_id, name, race_date, first_practice_date, second_practice_date, \
             third_practice_date, qualifying_date, sprint_date, round, status_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(self.season_id)
        .bind(self.track_id)
        .bind(&self.name)
        .bind(self.race_date)
        .bind(self.first_practice_date)
        .bind(self.second_practice_date)
        .bind(self.third_practice_date)
        .bind(self.qualifying_date)
        .bind(self.sprint_date)
        .bind(self.round)
        .bind(self.status_id)
        .execute(conn)
        .await?;
        Ok(done.last_insert_rowid())
    }

    async fn update(&self, conn: &mut SqliteConnection, id: &i64) -> Result<()> {
        sqlx::query(
            "UPDATE race SET track_id = ?, name = ?, race_date = ?, \
             first_practice_date = COALESCE(?, first_practice_date), second_practice_date = COALESCE(?, second_practice_date), \
             third_practice_date = COALESCE(?, third_practice_date), qualifying_date = COALESCE(?, qualifying_date), \
             sprint_date = COALESCE(?, sprint_date), status_id = COALESCE(?, status_id) \
             WHERE id = ?",
        )
        .bind(self.track_id)
        .bind(&self.name)
        .bind(self.race_date)
        .bind(self.first_practice_date)
        .bind(self.second_practice_date)
        .bind(self.third_practice_date)
        .bind(self.qualifying_date)
        .bind(self.sprint_date)
        .bind(self.status_id)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultKey {
    pub race_id: i64,
    pub driver_id: i64,
    pub team_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewResult {
    pub key: ResultKey,
    pub start_position: i64,
    pub finish_position: Option<i64>,
    /// Seconds
    pub best_lap_time: Option<f64>,
    pub points: f64,
    pub status_id: Option<i64>,
}

#[async_trait]
impl Upsert for NewResult {
    type Key = ResultKey;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<ResultKey>> {
        let found: Option<i64> = sqlx::query_scalar("SELECT race_id FROM result WHERE race_id = ? AND driver_id = ? AND team_id = ?")
            .bind(self.key.race_id)
            .bind(self.key.driver_id)
            .bind(self.key.team_id)
            .fetch_optional(conn)
            .await?;
        Ok(found.map(|_| self.key))
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<ResultKey> {
        sqlx::query(
            "INSERT INTO result (race_id, driver_id, team_id, start_position, finish_position, best_lap_time, points, status_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(self.key.race_id)
        .bind(self.key.driver_id)
        .bind(self.key.team_id)
        .bind(self.start_position)
        .bind(self.finish_position)
        .bind(self.best_lap_time)
        .bind(self.points)
        .bind(self.status_id)
        .execute(conn)
        .await?;
        Ok(self.key)
    }

    async fn update(&self, conn: &mut SqliteConnection, key: &ResultKey) -> Result<()> {
        sqlx::query(
            "UPDATE result SET start_position = ?, finish_position = ?, best_lap_time = COALESCE(?, best_lap_time), \
             points = ?, status_id = COALESCE(?, status_id) \
             WHERE race_id = ? AND driver_id = ? AND team_id = ?",
        )
        .bind(self.start_position)
        .bind(self.finish_position)
        .bind(self.best_lap_time)
        .bind(self.points)
        .bind(self.status_id)
        .bind(key.race_id)
        .bind(key.driver_id)
        .bind(key.team_id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

/// Driver standings are keyed by (season, driver); constructor standings by (season, team) with no driver.
#[derive(Debug, Clone)]
pub struct NewStanding {
    pub season_id: i64,
    pub driver_id: Option<i64>,
    pub team_id: Option<i64>,
    pub points: f64,
    pub position: Option<i64>,
    pub victories: i64,
    pub podiums: i64,
}

#[async_trait]
impl Upsert for NewStanding {
    type Key = i64;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        let query = match self.driver_id {
            Some(driver_id) => sqlx::query_scalar::<_, i64>("SELECT id FROM standing WHERE season_id = ? AND driver_id = ?")
                .bind(self.season_id)
                .bind(driver_id),
            None => sqlx::query_scalar::<_, i64>("SELECT id FROM standing WHERE season_id = ? AND driver_id IS NULL AND team_id IS ?")
                .bind(self.season_id)
                .bind(self.team_id),
        };
        Ok(query.fetch_optional(conn).await?)
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let done = sqlx::query(
            "INSERT INTO standing (season_id, driver_id, team_id, points, position, victories, podiums) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(self.season_id)
        .bind(self.driver_id)
        .bind(self.team_id)
        .bind(self.points)
        .bind(self.position)
        .bind(self.victories)
        .bind(self.podiums)
        .execute(conn)
        .await?;
        Ok(done.last_insert_rowid())
    }

    async fn update(&self, conn: &mut SqliteConnection, id: &i64) -> Result<()> {
        sqlx::query(
            "UPDATE standing SET team_id = COALESCE(?, team_id), points = ?, position = ?, victories = ?, podiums = ? \
             WHERE id = ?",
        )
        .bind(self.team_id)
        .bind(self.points)
        .bind(self.position)
        .bind(self.victories)
        .bind(self.podiums)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewPitStop {
    pub race_id: i64,
    pub driver_id: i64,
    pub lap: i64,
    pub stop: i64,
    pub stop_time: Option<NaiveDateTime>,
    /// Seconds
    pub duration: Option<f64>,
}

#[async_trait]
impl Upsert for NewPitStop {
    type Key = i64;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        Ok(sqlx::query_scalar("SELECT id FROM pitstop WHERE race_id = ? AND driver_id = ? AND stop = ?")
            .bind(self.race_id)
            .bind(self.driver_id)
            .bind(self.stop)
            .fetch_optional(conn)
            .await?)
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<i64> {
        let done = sqlx::query("INSERT INTO pitstop (race_id, driver_id, lap, stop, stop_time, duration) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(self.race_id)
            .bind(self.driver_id)
            .bind(self.lap)
            .bind(self.stop)
            .bind(self.stop_time)
            .bind(self.duration)
            .execute(conn)
            .await?;
        Ok(done.last_insert_rowid())
    }

    async fn update(&self, conn: &mut SqliteConnection, id: &i64) -> Result<()> {
        sqlx::query("UPDATE pitstop SET lap = ?, stop_time = COALESCE(?, stop_time), duration = COALESCE(?, duration) WHERE id = ?")
            .bind(self.lap)
            .bind(self.stop_time)
            .bind(self.duration)
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{Team, Track};
    use crate::store::{Database, Table, upsert};

    #[tokio::test]
    async fn test_team_update_keeps_unknown_fields() {
        let db = Database::in_memory().await.unwrap();
        let mut tx = db.begin().await.unwrap();

        let first = NewTeam {
            name: "Mercedes".to_string(),
            external_ref: Some("mercedes".to_string()),
            team_manager: Some("Toto Wolff".to_string()),
            main_color: Some("#27F4D2".to_string()),
            ..Default::default()
        };
        let id = upsert(&mut tx, &first).await.unwrap().into_key();

        let refresh = NewTeam { name: "Mercedes".to_string(), external_ref: Some("mercedes".to_string()), ..Default::default() };
        assert!(!upsert(&mut tx, &refresh).await.unwrap().was_inserted());
        tx.commit().await.unwrap();

        let team: Team = sqlx::query_as("SELECT * FROM team WHERE id = ?").bind(id).fetch_one(db.pool()).await.unwrap();
        assert_eq!(team.team_manager.as_deref(), Some("Toto Wolff"));
        assert_eq!(team.main_color, "#27F4D2");
        assert_eq!(db.count(Table::Team).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_track_placeholders_and_best_lap() {
        let db = Database::in_memory().await.unwrap();
        let mut tx = db.begin().await.unwrap();

        let driver_id = upsert(&mut tx, &NewDriver::named("Max", "Verstappen")).await.unwrap().into_key();
        let track = NewTrack { name: "Bahrain International Circuit".to_string(), city: "Sakhir".to_string(), ..Default::default() };
        let track_id = upsert(&mut tx, &track).await.unwrap().into_key();

        assert!(record_best_lap(&mut tx, track_id, 93.5, driver_id).await.unwrap());
        assert!(!record_best_lap(&mut tx, track_id, 95.0, driver_id).await.unwrap());
        assert!(record_best_lap(&mut tx, track_id, 92.1, driver_id).await.unwrap());
        assert!(!record_best_lap(&mut tx, track_id, 0.0, driver_id).await.unwrap());
        tx.commit().await.unwrap();

        let stored: Track = sqlx::query_as("SELECT * FROM track WHERE id = ?").bind(track_id).fetch_one(db.pool()).await.unwrap();
        assert_eq!(stored.turns_number, 0);
        assert_eq!(stored.geojson_data, "{}");
        assert_eq!(stored.corners, "[]");
        assert_eq!(stored.best_lap, Some(92.1));
        assert_eq!(stored.best_lap_driver, Some(driver_id));
    }

    #[tokio::test]
    async fn test_standing_keys() {
        let db = Database::in_memory().await.unwrap();
        let mut tx = db.begin().await.unwrap();

        let season_id = upsert(&mut tx, &NewSeason { year: 2023 }).await.unwrap().into_key();
        let team_id = upsert(&mut tx, &NewTeam { name: "Red Bull".to_string(), ..Default::default() }).await.unwrap().into_key();
        let driver_id = upsert(&mut tx, &NewDriver::named("Max", "Verstappen")).await.unwrap().into_key();

        let driver_standing = NewStanding { season_id, driver_id: Some(driver_id), team_id: Some(team_id), points: 575.0, position: Some(1), victories: 19, podiums: 21 };
        let team_standing = NewStanding { driver_id: None, points: 860.0, ..driver_standing.clone() };

        let a = upsert(&mut tx, &driver_standing).await.unwrap();
        let b = upsert(&mut tx, &team_standing).await.unwrap();
        let c = upsert(&mut tx, &driver_standing).await.unwrap();
        tx.commit().await.unwrap();

        assert!(a.was_inserted());
        assert!(b.was_inserted());
        assert_eq!(c, crate::store::UpsertOutcome::Updated(*a.key()));
        assert_eq!(db.count(Table::Standing).await.unwrap(), 2);
    }
}
