/// Extract-transform-load routines, one per entity
///
/// Every routine reads one or more remote tables, resolves foreign keys against entities
/// synchronized earlier, and upserts inside a single transaction per batch. Routines must run
/// in dependency order: countries, seasons, statuses, tracks, teams, drivers, races and
/// results, standings, pit stops. `pipeline::run_all` does exactly that.
pub mod country;
pub mod driver;
pub mod pipeline;
pub mod pitstop;
pub mod race;
pub mod season;
pub mod standing;
pub mod status;
pub mod team;
pub mod track;


use crate::data_sync::crosswalk::TeamCrosswalk;
use crate::data_sync::ergast::ErgastApi;
use crate::data_sync::source::{CachedSource, HttpSource, JsonSource, ThrottledSource};
use crate::data_sync::telemetry::{HttpTelemetry, TelemetrySource};
use crate::data_sync::SyncConfig;
use crate::enrich::Enricher;
use crate::error::Result;
use crate::store::{Database, UpsertOutcome, resolver};
use crate::utils::config_loader::ConfigSectionLoader;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Row tally of one routine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed_batches: usize,
}

impl SyncReport {
    pub fn record<K>(&mut self, outcome: &UpsertOutcome<K>) {
        if outcome.was_inserted() {
            self.inserted += 1;
        } else {
            self.updated += 1;
        }
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn merge(&mut self, other: SyncReport) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.failed_batches += other.failed_batches;
    }

    pub fn touched(&self) -> usize {
        self.inserted + self.updated
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} skipped, {} failed batches",
            self.inserted, self.updated, self.skipped, self.failed_batches
        )
    }
}

/// Shared context of every routine: the database, both remote sources and the configuration.
pub struct Synchronizer {
    db: Database,
    source: Arc<dyn JsonSource>,
    /// `source` paced by the configured request delay, shared by every results API paginator
    ergast_source: ThrottledSource,
    telemetry: Arc<dyn TelemetrySource>,
    crosswalk: TeamCrosswalk,
    config: SyncConfig,
}

impl Synchronizer {
    pub fn new(
        db: Database,
        source: Arc<dyn JsonSource>,
        telemetry: Arc<dyn TelemetrySource>,
        crosswalk: TeamCrosswalk,
        config: SyncConfig,
    ) -> Self {
        let ergast_source = ThrottledSource::new(source.clone(), config.request_delay());
        Self { db, source, ergast_source, telemetry, crosswalk, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub(crate) fn ergast(&self) -> ErgastApi<'_> {
        ErgastApi::new(&self.ergast_source, &self.config.ergast_base_url, self.config.page_size)
    }

    pub(crate) fn source(&self) -> &dyn JsonSource {
        self.source.as_ref()
    }

    pub(crate) fn enricher(&self) -> Enricher<'_> {
        Enricher::new(self.telemetry.as_ref(), &self.crosswalk)
    }

    /// One year when given, every stored season otherwise.
    pub(crate) async fn target_years(&self, year: Option<i64>) -> Result<Vec<i64>> {
        if let Some(year) = year {
            return Ok(vec![year]);
        }
        let mut conn = self.db.pool().acquire().await?;
        Ok(resolver::seasons(&mut conn).await?.into_iter().map(|s| s.year).collect())
    }

    /// Outcome of one season batch: network failures abort the run, anything else is logged
    /// and the loop moves on to the next season.
    pub(crate) fn settle_season(&self, what: &str, year: i64, outcome: Result<SyncReport>, report: &mut SyncReport) -> Result<()> {
        match outcome {
            Ok(season_report) => {
                info!("{} {}: {}", what, year, season_report);
                report.merge(season_report);
                Ok(())
            }
            Err(e) if e.is_network() => Err(e),
            Err(e) => {
                error!("{} {} rolled back: {}", what, year, e);
                report.failed_batches += 1;
                Ok(())
            }
        }
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}

/// Builder for Synchronizer; anything not provided is created from the configuration.
pub struct SynchronizerBuilder {
    config: Option<SyncConfig>,
    db: Option<Database>,
    source: Option<Arc<dyn JsonSource>>,
    telemetry: Option<Arc<dyn TelemetrySource>>,
    crosswalk: Option<TeamCrosswalk>,
}

impl SynchronizerBuilder {
    pub fn new() -> Self {
        Self { config: None, db: None, source: None, telemetry: None, crosswalk: None }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_source(mut self, source: Arc<dyn JsonSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySource>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn with_crosswalk(mut self, crosswalk: TeamCrosswalk) -> Self {
        self.crosswalk = Some(crosswalk);
        self
    }

    pub async fn build(self) -> Result<Synchronizer> {
        let config = match self.config {
            Some(config) => config,
            None => SyncConfig::from_env()?,
        };

        let http = || -> Result<Arc<dyn JsonSource>> { Ok(Arc::new(HttpSource::new(config.http_timeout())?)) };

        let source = match self.source {
            Some(source) => source,
            None => http()?,
        };

        let telemetry: Arc<dyn TelemetrySource> = match self.telemetry {
            Some(telemetry) => telemetry,
            None => {
                let telemetry_source: Arc<dyn JsonSource> = match &config.telemetry_cache_dir {
                    Some(dir) => Arc::new(CachedSource::new(http()?, dir)),
                    None => http()?,
                };
                Arc::new(HttpTelemetry::new(telemetry_source, &config.openf1_base_url, &config.circuit_info_base_url))
            }
        };

        let crosswalk = match (self.crosswalk, &config.team_crosswalk_file) {
            (Some(crosswalk), _) => crosswalk,
            (None, Some(path)) => {
                let crosswalk = TeamCrosswalk::load_section_from_file(path).await?;
                info!("Loaded {} team crosswalk entries from {}", crosswalk.len(), path.display());
                crosswalk
            }
            (None, None) => TeamCrosswalk::default(),
        };

        let db = match self.db {
            Some(db) => db,
            None => Database::connect(&config.database_url).await?,
        };

        Ok(Synchronizer::new(db, source, telemetry, crosswalk, config))
    }
}

impl Default for SynchronizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
