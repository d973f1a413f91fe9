use crate::data_sync::source::JsonSource;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum SessionType {
    #[strum(serialize = "Practice 1")]
    Practice1,
    #[strum(serialize = "Practice 2")]
    Practice2,
    #[strum(serialize = "Practice 3")]
    Practice3,
    #[strum(serialize = "Qualifying")]
    Qualifying,
    #[strum(serialize = "Sprint")]
    Sprint,
    #[strum(serialize = "Race")]
    Race,
}

/// A race weekend as the telemetry API names it.
#[derive(Debug, Clone, Deserialize)]
pub struct Meeting {
    pub meeting_key: i64,
    pub meeting_name: String,
    pub year: i64,
    #[serde(default)]
    pub circuit_key: Option<i64>,
    #[serde(default)]
    pub circuit_short_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    /// Offset to UTC, e.g. `03:00:00` or `-05:00:00`
    #[serde(default)]
    pub gmt_offset: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySession {
    pub session_key: i64,
    pub session_name: String,
    pub meeting_key: i64,
    #[serde(default)]
    pub circuit_key: Option<i64>,
    #[serde(default)]
    pub year: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCorner {
    pub number: i64,
    #[serde(default)]
    pub letter: String,
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub length: f64,
    pub track_position: TrackPosition,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitLayout {
    #[serde(default)]
    pub circuit_name: Option<String>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub x: Vec<f64>,
    #[serde(default)]
    pub y: Vec<f64>,
    #[serde(default)]
    pub corners: Vec<LayoutCorner>,
}

/// One car entry of a session; several drivers share a team.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamEntry {
    #[serde(default)]
    pub team_name: Option<String>,
    /// Hex color without `#`
    #[serde(default)]
    pub team_colour: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Secondary source for session-level data: circuit geometry and team branding.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn meetings(&self, year: i64) -> Result<Vec<Meeting>>;

    async fn sessions(&self, meeting_key: i64, session_type: SessionType) -> Result<Vec<TelemetrySession>>;

    async fn circuit_layout(&self, circuit_key: i64, year: i64) -> Result<CircuitLayout>;

    async fn team_entries(&self, session_key: i64) -> Result<Vec<TeamEntry>>;
}

/// OpenF1 for sessions and entries, MultiViewer for circuit layouts.
pub struct HttpTelemetry {
    source: Arc<dyn JsonSource>,
    openf1_base_url: String,
    circuit_info_base_url: String,
    meetings_by_year: DashMap<i64, Vec<Meeting>>,
}

impl HttpTelemetry {
    pub fn new(source: Arc<dyn JsonSource>, openf1_base_url: impl Into<String>, circuit_info_base_url: impl Into<String>) -> Self {
        Self {
            source,
            openf1_base_url: openf1_base_url.into().trim_end_matches('/').to_string(),
            circuit_info_base_url: circuit_info_base_url.into().trim_end_matches('/').to_string(),
            meetings_by_year: DashMap::new(),
        }
    }

    pub fn meetings_url(&self, year: i64) -> String {
        format!("{}/meetings?year={}", self.openf1_base_url, year)
    }

    pub fn sessions_url(&self, meeting_key: i64, session_type: SessionType) -> String {
        format!(
            "{}/sessions?meeting_key={}&session_name={}",
            self.openf1_base_url,
            meeting_key,
            session_type.to_string().replace(' ', "%20")
        )
    }

    pub fn drivers_url(&self, session_key: i64) -> String {
        format!("{}/drivers?session_key={}", self.openf1_base_url, session_key)
    }

    pub fn circuit_url(&self, circuit_key: i64, year: i64) -> String {
        format!("{}/circuits/{}/{}", self.circuit_info_base_url, circuit_key, year)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.source.get_json(url).await?;
        serde_json::from_value(body).map_err(|e| SyncError::payload(url, e))
    }
}

#[async_trait]
impl TelemetrySource for HttpTelemetry {
    async fn meetings(&self, year: i64) -> Result<Vec<Meeting>> {
        if let Some(cached) = self.meetings_by_year.get(&year) {
            return Ok(cached.clone());
        }

        let meetings: Vec<Meeting> = self.fetch(&self.meetings_url(year)).await?;
        debug!("Telemetry: {} meetings in {}", meetings.len(), year);
        self.meetings_by_year.insert(year, meetings.clone());
        Ok(meetings)
    }

    async fn sessions(&self, meeting_key: i64, session_type: SessionType) -> Result<Vec<TelemetrySession>> {
        self.fetch(&self.sessions_url(meeting_key, session_type)).await
    }

    async fn circuit_layout(&self, circuit_key: i64, year: i64) -> Result<CircuitLayout> {
        self.fetch(&self.circuit_url(circuit_key, year)).await
    }

    async fn team_entries(&self, session_key: i64) -> Result<Vec<TeamEntry>> {
        self.fetch(&self.drivers_url(session_key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StaticSource;
    use serde_json::json;
    use std::str::FromStr;

    fn telemetry(source: Arc<StaticSource>) -> HttpTelemetry {
        HttpTelemetry::new(source, "https://openf1.test/v1/", "https://circuits.test/api/v1")
    }

    #[test]
    fn test_session_type_names() {
        assert_eq!(SessionType::Practice1.to_string(), "Practice 1");
        assert_eq!(SessionType::from_str("Race").unwrap(), SessionType::Race);
    }

    #[test]
    fn test_urls() {
        let t = telemetry(Arc::new(StaticSource::new()));
        assert_eq!(t.meetings_url(2023), "https://openf1.test/v1/meetings?year=2023");
        assert_eq!(t.sessions_url(1141, SessionType::Practice2), "https://openf1.test/v1/sessions?meeting_key=1141&session_name=Practice%202");
        assert_eq!(t.circuit_url(63, 2023), "https://circuits.test/api/v1/circuits/63/2023");
    }

    #[tokio::test]
    async fn test_meetings_are_memoized_per_year() {
        let source = Arc::new(StaticSource::new().with(
            "https://openf1.test/v1/meetings?year=2023",
            json!([{"meeting_key": 1141, "meeting_name": "Bahrain Grand Prix", "year": 2023, "circuit_key": 63}]),
        ));
        let t = telemetry(source.clone());

        assert_eq!(t.meetings(2023).await.unwrap().len(), 1);
        assert_eq!(t.meetings(2023).await.unwrap()[0].circuit_key, Some(63));
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_circuit_layout_decoding() {
        let source = Arc::new(StaticSource::new().with(
            "https://circuits.test/api/v1/circuits/63/2023",
            json!({
                "circuitName": "Sakhir",
                "rotation": 92.0,
                "x": [0.0, 10.0, 20.0],
                "y": [0.0, 5.0, 0.0],
                "corners": [
                    {"number": 1, "letter": "", "angle": 45.0, "length": 650.2, "trackPosition": {"x": 10.0, "y": 5.0}}
                ]
            }),
        ));

        let layout = telemetry(source).circuit_layout(63, 2023).await.unwrap();
        assert_eq!(layout.corners.len(), 1);
        assert_eq!(layout.corners[0].track_position.x, 10.0);
        assert_eq!(layout.x.len(), 3);
    }
}
