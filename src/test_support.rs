//! Canned sources and payload builders shared by the unit tests.
use crate::data_sync::source::JsonSource;
use crate::data_sync::telemetry::{CircuitLayout, Meeting, SessionType, TeamEntry, TelemetrySession, TelemetrySource};
use crate::data_sync::paginator::page_url;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves fixed JSON bodies by exact URL; anything else answers 404.
#[derive(Default)]
pub struct StaticSource {
    responses: Mutex<HashMap<String, Value>>,
    requests: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, body: Value) -> Self {
        self.set(url, body);
        self
    }

    /// Replace or add a response after the source has been shared.
    pub fn set(&self, url: &str, body: Value) {
        self.responses.lock().unwrap().insert(url.to_string(), body);
    }

    /// Register every page of a results API table, followed by the terminating empty page.
    pub fn set_table(&self, endpoint: &str, page_size: u32, table: &str, items: &str, records: Vec<Value>) {
        let mut offset = 0;
        for chunk in records.chunks(page_size as usize) {
            self.set(&page_url(endpoint, page_size, offset), ergast_envelope(json!({ table: { items: chunk } })));
            offset += page_size;
        }
        self.set(&page_url(endpoint, page_size, offset), ergast_envelope(json!({})));
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JsonSource for StaticSource {
    async fn get_json(&self, url: &str) -> Result<Value> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| SyncError::Status { url: url.to_string(), status: 404 })
    }
}

pub fn ergast_envelope(tables: Value) -> Value {
    let mut data = json!({"xmlns": "", "series": "f1", "limit": "30", "offset": "0", "total": "0"});
    if let (Some(data), Some(tables)) = (data.as_object_mut(), tables.as_object()) {
        data.extend(tables.clone());
    }
    json!({ "MRData": data })
}

pub fn rest_country(iso: &str, name: &str, demonym: &str, alt_spellings: &[&str]) -> Value {
    let flag_code = alt_spellings.first().copied().unwrap_or(iso).to_lowercase();
    json!({
        "name": {"common": name, "official": name},
        "cca3": iso,
        "flags": {"png": format!("https://flagcdn.com/w320/{}.png", flag_code), "svg": format!("https://flagcdn.com/{}.svg", flag_code)},
        "altSpellings": alt_spellings,
        "timezones": ["UTC"],
        "demonyms": {"eng": {"f": demonym, "m": demonym}}
    })
}

pub fn ergast_driver(id: &str, code: &str, given: &str, family: &str, nationality: &str, number: &str) -> Value {
    json!({
        "driverId": id,
        "permanentNumber": number,
        "code": code,
        "givenName": given,
        "familyName": family,
        "dateOfBirth": "1985-01-07",
        "nationality": nationality
    })
}

pub fn ergast_constructor(id: &str, name: &str, nationality: &str) -> Value {
    json!({"constructorId": id, "name": name, "nationality": nationality})
}

pub fn ergast_circuit(id: &str, name: &str, locality: &str, country: &str) -> Value {
    json!({
        "circuitId": id,
        "circuitName": name,
        "Location": {"lat": "0", "long": "0", "locality": locality, "country": country}
    })
}

pub fn ergast_result(position: u32, points: &str, grid: u32, driver: Value, constructor: Value, status: &str, fastest: Option<&str>) -> Value {
    let mut result = json!({
        "number": "1",
        "position": position.to_string(),
        "positionText": position.to_string(),
        "points": points,
        "Driver": driver,
        "Constructor": constructor,
        "grid": grid.to_string(),
        "laps": "57",
        "status": status
    });
    if let (Some(lap), Some(obj)) = (fastest, result.as_object_mut()) {
        obj.insert("FastestLap".to_string(), json!({"rank": "1", "lap": "44", "Time": {"time": lap}}));
    }
    result
}

pub fn ergast_race(season: i64, round: i64, name: &str, circuit: Value, date: &str, results: Vec<Value>) -> Value {
    json!({
        "season": season.to_string(),
        "round": round.to_string(),
        "raceName": name,
        "Circuit": circuit,
        "date": date,
        "time": "15:00:00Z",
        "Results": results
    })
}

/// Telemetry backed by in-memory tables.
#[derive(Default)]
pub struct StaticTelemetry {
    meetings: Vec<Meeting>,
    sessions: HashMap<(i64, SessionType), Vec<TelemetrySession>>,
    layouts: HashMap<(i64, i64), CircuitLayout>,
    entries: Mutex<HashMap<i64, Vec<TeamEntry>>>,
}

impl StaticTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One meeting with a race session keyed `meeting_key * 10`.
    pub fn with_race(mut self, year: i64, meeting_key: i64, meeting_name: &str, circuit_key: i64) -> Self {
        self.meetings.push(Meeting {
            meeting_key,
            meeting_name: meeting_name.to_string(),
            year,
            circuit_key: Some(circuit_key),
            circuit_short_name: None,
            location: None,
            country_name: None,
            gmt_offset: Some("03:00:00".to_string()),
        });
        self.sessions.insert(
            (meeting_key, SessionType::Race),
            vec![TelemetrySession {
                session_key: meeting_key * 10,
                session_name: SessionType::Race.to_string(),
                meeting_key,
                circuit_key: Some(circuit_key),
                year: Some(year),
            }],
        );
        self
    }

    pub fn with_layout(mut self, circuit_key: i64, year: i64, layout: CircuitLayout) -> Self {
        self.layouts.insert((circuit_key, year), layout);
        self
    }

    pub fn with_team(self, session_key: i64, team_name: &str, colour: &str) -> Self {
        self.set_team(session_key, team_name, colour);
        self
    }

    /// Adds or recolors a team of a session.
    pub fn set_team(&self, session_key: i64, team_name: &str, colour: &str) {
        let mut entries = self.entries.lock().unwrap();
        let session = entries.entry(session_key).or_default();
        session.retain(|e| e.team_name.as_deref() != Some(team_name));
        session.push(TeamEntry {
            team_name: Some(team_name.to_string()),
            team_colour: Some(colour.to_string()),
            full_name: None,
        });
    }
}

#[async_trait]
impl TelemetrySource for StaticTelemetry {
    async fn meetings(&self, year: i64) -> Result<Vec<Meeting>> {
        Ok(self.meetings.iter().filter(|m| m.year == year).cloned().collect())
    }

    async fn sessions(&self, meeting_key: i64, session_type: SessionType) -> Result<Vec<TelemetrySession>> {
        Ok(self.sessions.get(&(meeting_key, session_type)).cloned().unwrap_or_default())
    }

    async fn circuit_layout(&self, circuit_key: i64, year: i64) -> Result<CircuitLayout> {
        self.layouts
            .get(&(circuit_key, year))
            .cloned()
            .ok_or_else(|| SyncError::Status { url: format!("static://circuits/{}/{}", circuit_key, year), status: 404 })
    }

    async fn team_entries(&self, session_key: i64) -> Result<Vec<TeamEntry>> {
        Ok(self.entries.lock().unwrap().get(&session_key).cloned().unwrap_or_default())
    }
}

/// Telemetry whose every request fails.
pub struct FailingTelemetry;

#[async_trait]
impl TelemetrySource for FailingTelemetry {
    async fn meetings(&self, year: i64) -> Result<Vec<Meeting>> {
        Err(SyncError::Status { url: format!("failing://meetings/{}", year), status: 503 })
    }

    async fn sessions(&self, meeting_key: i64, _session_type: SessionType) -> Result<Vec<TelemetrySession>> {
        Err(SyncError::Status { url: format!("failing://sessions/{}", meeting_key), status: 503 })
    }

    async fn circuit_layout(&self, circuit_key: i64, _year: i64) -> Result<CircuitLayout> {
        Err(SyncError::Status { url: format!("failing://circuits/{}", circuit_key), status: 503 })
    }

    async fn team_entries(&self, session_key: i64) -> Result<Vec<TeamEntry>> {
        Err(SyncError::Status { url: format!("failing://drivers/{}", session_key), status: 503 })
    }
}
