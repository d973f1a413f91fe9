/// Derived-field extraction from the telemetry APIs
///
/// The telemetry side keys everything by event name and team display name, so lookups go
/// through name normalization (`event_names`) and fuzzy team matching (`team_profile`).
/// Enrichment is never a hard dependency: every failure is logged at `warn` and degrades
/// to `None` or an empty list, which the synchronizers store as placeholders.
pub mod event_names;
pub mod team_profile;
pub mod track_geometry;

pub use team_profile::{TeamProfile, build_profile, normalize_color};
pub use track_geometry::{Corner, TrackGeometry};

use crate::data_sync::crosswalk::TeamCrosswalk;
use crate::data_sync::telemetry::{Meeting, SessionType, TeamEntry, TelemetrySession, TelemetrySource};
use crate::error::Result;
use tracing::{debug, warn};

/// A telemetry session matched to an event of the results API.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub year: i64,
    pub meeting: Meeting,
    pub session: TelemetrySession,
}

pub struct Enricher<'a> {
    telemetry: &'a dyn TelemetrySource,
    crosswalk: &'a TeamCrosswalk,
}

impl<'a> Enricher<'a> {
    pub fn new(telemetry: &'a dyn TelemetrySource, crosswalk: &'a TeamCrosswalk) -> Self {
        Self { telemetry, crosswalk }
    }

    pub async fn find_session(&self, year: i64, event_name: &str, session_type: SessionType) -> Option<SessionContext> {
        match self.try_find_session(year, event_name, session_type).await {
            Ok(Some(context)) => Some(context),
            Ok(None) => {
                warn!("No telemetry {} session for {} {}", session_type, year, event_name);
                None
            }
            Err(e) => {
                warn!("Telemetry lookup failed for {} {}: {}", year, event_name, e);
                None
            }
        }
    }

    async fn try_find_session(&self, year: i64, event_name: &str, session_type: SessionType) -> Result<Option<SessionContext>> {
        let meetings = self.telemetry.meetings(year).await?;
        let Some(meeting) = event_names::find_meeting(&meetings, event_name) else {
            return Ok(None);
        };

        let sessions = self.telemetry.sessions(meeting.meeting_key, session_type).await?;
        Ok(sessions.into_iter().next().map(|session| SessionContext { year, meeting: meeting.clone(), session }))
    }

    /// Latest race session of a season that lists any team.
    pub async fn latest_team_entries(&self, year: i64) -> Vec<TeamEntry> {
        let meetings = match self.telemetry.meetings(year).await {
            Ok(meetings) => meetings,
            Err(e) => {
                warn!("Telemetry meetings unavailable for {}: {}", year, e);
                return Vec::new();
            }
        };

        for meeting in meetings.iter().rev() {
            let sessions = match self.telemetry.sessions(meeting.meeting_key, SessionType::Race).await {
                Ok(sessions) => sessions,
                Err(e) => {
                    warn!("Telemetry sessions unavailable for {}: {}", meeting.meeting_name, e);
                    return Vec::new();
                }
            };
            let Some(session) = sessions.first() else {
                continue;
            };

            let context = SessionContext { year, meeting: meeting.clone(), session: session.clone() };
            let entries = self.team_entries(&context).await;
            if !entries.is_empty() {
                debug!("Team branding taken from {} {}", year, meeting.meeting_name);
                return entries;
            }
        }
        Vec::new()
    }

    pub async fn track_geometry(&self, context: &SessionContext) -> Option<TrackGeometry> {
        let circuit_key = context.session.circuit_key.or(context.meeting.circuit_key)?;

        match self.telemetry.circuit_layout(circuit_key, context.year).await {
            Ok(layout) => {
                let geometry = TrackGeometry::from_layout(&layout, context.meeting.gmt_offset.as_deref());
                if geometry.is_none() {
                    warn!("Circuit {} has no usable layout for {}", circuit_key, context.year);
                }
                geometry
            }
            Err(e) => {
                warn!("Circuit layout unavailable for {} {}: {}", context.year, context.meeting.meeting_name, e);
                None
            }
        }
    }

    pub async fn team_entries(&self, context: &SessionContext) -> Vec<TeamEntry> {
        match self.telemetry.team_entries(context.session.session_key).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Team entries unavailable for session {}: {}", context.session.session_key, e);
                Vec::new()
            }
        }
    }

    pub fn team_profile(&self, team_name: &str, entries: &[TeamEntry]) -> TeamProfile {
        build_profile(self.crosswalk, team_name, entries)
    }
}
