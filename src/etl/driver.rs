use crate::data_sync::ergast::ErgastDriver;
use crate::error::Result;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::records::NewDriver;
use crate::store::{resolver, upsert};
use crate::utils::parse::{non_empty, parse_date, parse_int};
use sqlx::SqliteConnection;
use tracing::info;

pub(crate) async fn driver_record(conn: &mut SqliteConnection, driver: &ErgastDriver, team_id: Option<i64>) -> Result<NewDriver> {
    let birth_country = match driver.nationality.as_deref() {
        Some(nationality) => resolver::country_by_demonym(conn, nationality).await?,
        None => None,
    };

    Ok(NewDriver {
        first_name: driver.given_name.clone(),
        last_name: driver.family_name.clone(),
        code_name: non_empty(driver.code.as_deref()),
        external_ref: Some(driver.driver_id.clone()),
        birth_date: driver.date_of_birth.as_deref().and_then(parse_date),
        birth_country,
        grid_number: driver.permanent_number.as_deref().and_then(parse_int),
        team_id,
    })
}

impl Synchronizer {
    /// Every driver of the results API. Teams are attached later, from race results.
    pub async fn sync_drivers(&self) -> Result<SyncReport> {
        info!("Syncing drivers");
        let drivers = self.ergast().drivers().collect_all().await?;

        let mut report = SyncReport::default();
        let mut tx = self.database().begin().await?;
        for driver in &drivers {
            let record = driver_record(&mut tx, driver, None).await?;
            report.record(&upsert(&mut tx, &record).await?);
        }
        tx.commit().await?;

        info!("Drivers: {}", report);
        Ok(report)
    }
}
