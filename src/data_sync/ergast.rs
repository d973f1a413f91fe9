//! Payloads and endpoints of the Ergast-compatible historical results API.
//!
//! All numeric fields arrive as strings; they are kept as strings here and parsed by the synchronizers,
//! which decide how malformed values degrade.
use crate::data_sync::paginator::Paginator;
use crate::data_sync::source::JsonSource;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ErgastSeason {
    pub season: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgastDriver {
    pub driver_id: String,
    #[serde(default)]
    pub permanent_number: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    pub given_name: String,
    pub family_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgastConstructor {
    pub constructor_id: String,
    pub name: String,
    #[serde(default)]
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErgastLocation {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub long: Option<String>,
    pub locality: String,
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgastCircuit {
    pub circuit_id: String,
    pub circuit_name: String,
    #[serde(rename = "Location")]
    pub location: ErgastLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErgastSession {
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErgastLapTime {
    pub time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErgastFastestLap {
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub lap: Option<String>,
    #[serde(rename = "Time", default)]
    pub time: Option<ErgastLapTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgastResult {
    #[serde(default)]
    pub number: Option<String>,
    pub position: String,
    #[serde(default)]
    pub position_text: Option<String>,
    pub points: String,
    #[serde(rename = "Driver")]
    pub driver: ErgastDriver,
    #[serde(rename = "Constructor")]
    pub constructor: ErgastConstructor,
    pub grid: String,
    #[serde(default)]
    pub laps: Option<String>,
    pub status: String,
    #[serde(rename = "FastestLap", default)]
    pub fastest_lap: Option<ErgastFastestLap>,
}

impl ErgastResult {
    pub fn fastest_lap_time(&self) -> Option<&str> {
        self.fastest_lap.as_ref()?.time.as_ref().map(|t| t.time.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgastPitStop {
    pub driver_id: String,
    pub lap: String,
    pub stop: String,
    pub time: String,
    pub duration: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgastRace {
    pub season: String,
    pub round: String,
    pub race_name: String,
    #[serde(rename = "Circuit")]
    pub circuit: ErgastCircuit,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(rename = "FirstPractice", default)]
    pub first_practice: Option<ErgastSession>,
    #[serde(rename = "SecondPractice", default)]
    pub second_practice: Option<ErgastSession>,
    #[serde(rename = "ThirdPractice", default)]
    pub third_practice: Option<ErgastSession>,
    #[serde(rename = "Qualifying", default)]
    pub qualifying: Option<ErgastSession>,
    #[serde(rename = "Sprint", default)]
    pub sprint: Option<ErgastSession>,
    #[serde(rename = "Results", default)]
    pub results: Vec<ErgastResult>,
    #[serde(rename = "PitStops", default)]
    pub pit_stops: Vec<ErgastPitStop>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgastDriverStanding {
    #[serde(default)]
    pub position: Option<String>,
    pub points: String,
    pub wins: String,
    #[serde(rename = "Driver")]
    pub driver: ErgastDriver,
    #[serde(rename = "Constructors", default)]
    pub constructors: Vec<ErgastConstructor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgastConstructorStanding {
    #[serde(default)]
    pub position: Option<String>,
    pub points: String,
    pub wins: String,
    #[serde(rename = "Constructor")]
    pub constructor: ErgastConstructor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErgastStandingsList {
    pub season: String,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(rename = "DriverStandings", default)]
    pub driver_standings: Vec<ErgastDriverStanding>,
    #[serde(rename = "ConstructorStandings", default)]
    pub constructor_standings: Vec<ErgastConstructorStanding>,
}

/// Builds paginators for every table the synchronizers read.
#[derive(Clone, Copy)]
pub struct ErgastApi<'a> {
    source: &'a dyn JsonSource,
    base_url: &'a str,
    page_size: u32,
}

impl<'a> ErgastApi<'a> {
    pub fn new(source: &'a dyn JsonSource, base_url: &'a str, page_size: u32) -> Self {
        Self { source, base_url, page_size }
    }

    pub fn endpoint(&self, path: &str) -> String {
        endpoint(self.base_url, path)
    }

    fn paginate<T: serde::de::DeserializeOwned>(&self, path: &str, pointer: &'static str) -> Paginator<'a, T> {
        Paginator::new(self.source, self.endpoint(path), pointer, self.page_size)
    }

    pub fn seasons(&self) -> Paginator<'a, ErgastSeason> {
        self.paginate("seasons", "/MRData/SeasonTable/Seasons")
    }

    pub fn circuits(&self) -> Paginator<'a, ErgastCircuit> {
        self.paginate("circuits", "/MRData/CircuitTable/Circuits")
    }

    pub fn drivers(&self) -> Paginator<'a, ErgastDriver> {
        self.paginate("drivers", "/MRData/DriverTable/Drivers")
    }

    pub fn constructors(&self, year: i64) -> Paginator<'a, ErgastConstructor> {
        self.paginate(&format!("{}/constructors", year), "/MRData/ConstructorTable/Constructors")
    }

    /// Race calendar of a season, with session dates.
    pub fn schedule(&self, year: i64) -> Paginator<'a, ErgastRace> {
        self.paginate(&format!("{}/races", year), "/MRData/RaceTable/Races")
    }

    /// Results are paginated per result row, so one race can span two pages.
    pub fn results(&self, year: i64) -> Paginator<'a, ErgastRace> {
        self.paginate(&format!("{}/results", year), "/MRData/RaceTable/Races")
    }

    pub fn pit_stops(&self, year: i64, round: i64) -> Paginator<'a, ErgastRace> {
        self.paginate(&format!("{}/{}/pitstops", year, round), "/MRData/RaceTable/Races")
    }

    pub fn driver_standings(&self, year: i64) -> Paginator<'a, ErgastStandingsList> {
        self.paginate(&format!("{}/driverStandings", year), "/MRData/StandingsTable/StandingsLists")
    }

    pub fn constructor_standings(&self, year: i64) -> Paginator<'a, ErgastStandingsList> {
        self.paginate(&format!("{}/constructorStandings", year), "/MRData/StandingsTable/StandingsLists")
    }
}

pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}/?format=json", base_url.trim_end_matches('/'), path)
}
