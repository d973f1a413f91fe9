use crate::data_sync::ergast::ErgastConstructor;
use crate::enrich::TeamProfile;
use crate::error::Result;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::records::NewTeam;
use crate::store::{resolver, upsert};
use ahash::AHashMap;
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

/// Team record for a constructor, with its country resolved from the nationality.
pub(crate) async fn team_record(conn: &mut SqliteConnection, constructor: &ErgastConstructor, profile: TeamProfile) -> Result<NewTeam> {
    let country_id = match constructor.nationality.as_deref() {
        Some(nationality) => resolver::country_by_demonym(conn, nationality).await?,
        None => None,
    };
    if country_id.is_none() {
        debug!("No country for constructor {} ({:?})", constructor.name, constructor.nationality);
    }

    Ok(NewTeam {
        name: constructor.name.clone(),
        external_ref: Some(constructor.constructor_id.clone()),
        country_id,
        team_manager: profile.team_manager,
        is_engine_constructor: profile.is_engine_constructor,
        engine_constructor: profile.engine_constructor,
        main_color: profile.main_color,
    })
}

impl Synchronizer {
    /// Constructors of every stored season (or one year), latest spelling winning, branded from the
    /// latest season's telemetry.
    pub async fn sync_teams(&self, year: Option<i64>) -> Result<SyncReport> {
        let years = self.target_years(year).await?;
        let Some(&latest_year) = years.iter().max() else {
            warn!("No seasons stored; sync seasons before teams");
            return Ok(SyncReport::default());
        };

        let mut order: Vec<String> = Vec::new();
        let mut constructors: AHashMap<String, ErgastConstructor> = AHashMap::new();
        for year in &years {
            info!("Fetching constructors for {}", year);
            for constructor in self.ergast().constructors(*year).collect_all().await? {
                if !constructors.contains_key(&constructor.constructor_id) {
                    order.push(constructor.constructor_id.clone());
                }
                constructors.insert(constructor.constructor_id.clone(), constructor);
            }
        }

        let enricher = self.enricher();
        let entries = enricher.latest_team_entries(latest_year).await;

        let mut report = SyncReport::default();
        let mut tx = self.database().begin().await?;
        for constructor_id in &order {
            let Some(constructor) = constructors.get(constructor_id) else {
                continue;
            };
            let profile = enricher.team_profile(&constructor.name, &entries);
            let team = team_record(&mut tx, constructor, profile).await?;
            report.record(&upsert(&mut tx, &team).await?);
        }
        tx.commit().await?;

        info!("Teams: {}", report);
        Ok(report)
    }
}
