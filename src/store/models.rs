use chrono::{NaiveDate, NaiveDateTime};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub iso_code: String,
    pub flag_url: Option<String>,
    pub timezone: Option<String>,
    pub alt_spellings: Option<String>,
    pub female_demonym: Option<String>,
    pub male_demonym: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Season {
    pub id: i64,
    pub year: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Status {
    pub id: i64,
    pub label: String,
    pub is_race_status: bool,
    pub is_driver_status: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub country_id: Option<i64>,
    pub turns_number: i64,
    /// Seconds
    pub best_lap: Option<f64>,
    pub best_lap_driver: Option<i64>,
    pub timezone: Option<String>,
    pub geojson_data: String,
    pub corners: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub country_id: Option<i64>,
    pub team_manager: Option<String>,
    pub is_engine_constructor: bool,
    pub engine_constructor: Option<String>,
    pub main_color: String,
    pub external_ref: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Driver {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub birth_country: Option<i64>,
    pub code_name: Option<String>,
    pub grid_number: Option<i64>,
    pub team_id: Option<i64>,
    pub external_ref: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Race {
    pub id: i64,
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

#[derive(Debug, Clone, FromRow)]
pub struct RaceResult {
    pub race_id: i64,
    pub driver_id: i64,
    pub team_id: i64,
    pub start_position: i64,
    pub finish_position: Option<i64>,
    pub best_lap_time: Option<f64>,
    pub points: f64,
    pub status_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Standing {
    pub id: i64,
    pub season_id: i64,
    pub driver_id: Option<i64>,
    pub team_id: Option<i64>,
    pub points: f64,
    pub position: Option<i64>,
    pub victories: i64,
    pub podiums: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct PitStop {
    pub id: i64,
    pub race_id: i64,
    pub driver_id: i64,
    pub lap: i64,
    pub stop: i64,
    pub stop_time: Option<NaiveDateTime>,
    pub duration: Option<f64>,
}
