use crate::data_sync::ergast::ErgastCircuit;
use crate::enrich::TrackGeometry;
use crate::error::Result;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::records::NewTrack;
use crate::store::{resolver, upsert};
use sqlx::SqliteConnection;
use tracing::{debug, info};

/// Track record for a circuit, with layout fields when enrichment produced them.
pub(crate) async fn track_record(
    conn: &mut SqliteConnection,
    circuit: &ErgastCircuit,
    geometry: Option<&TrackGeometry>,
) -> Result<NewTrack> {
    let country_id = resolver::country_by_name(conn, &circuit.location.country).await?;
    if country_id.is_none() {
        debug!("No country matches {:?} for {}", circuit.location.country, circuit.circuit_name);
    }

    Ok(NewTrack {
        name: circuit.circuit_name.clone(),
        city: circuit.location.locality.clone(),
        country_id,
        turns_number: geometry.map(|g| g.turns_number),
        timezone: geometry.and_then(|g| g.timezone.clone()),
        geojson_data: geometry.map(TrackGeometry::geojson_text),
        corners: geometry.map(TrackGeometry::corners_text),
    })
}

impl Synchronizer {
    /// Every circuit of the results API. Layout enrichment happens per race, where the session is known.
    pub async fn sync_tracks(&self) -> Result<SyncReport> {
        info!("Syncing tracks");
        let circuits = self.ergast().circuits().collect_all().await?;

        let mut report = SyncReport::default();
        let mut tx = self.database().begin().await?;
        for circuit in &circuits {
            let track = track_record(&mut tx, circuit, None).await?;
            report.record(&upsert(&mut tx, &track).await?);
        }
        tx.commit().await?;

        info!("Tracks: {}", report);
        Ok(report)
    }
}
