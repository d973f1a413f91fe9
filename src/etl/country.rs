use crate::data_sync::rest_countries::{RestCountry, fetch_all_countries};
use crate::error::Result;
use crate::etl::{SyncReport, Synchronizer};
use crate::store::records::NewCountry;
use crate::store::upsert;
use tracing::{debug, info};

impl From<&RestCountry> for NewCountry {
    fn from(country: &RestCountry) -> Self {
        Self {
            name: country.name.common.clone(),
            iso_code: country.cca3.clone(),
            flag_url: country.flag_url().map(str::to_string),
            timezone: country.first_timezone().map(str::to_string),
            alt_spellings: country.joined_alt_spellings(),
            female_demonym: country.female_demonym().map(str::to_string),
            male_demonym: country.male_demonym().map(str::to_string),
        }
    }
}

impl Synchronizer {
    /// Every country of the reference API, keyed by ISO alpha-3 code.
    pub async fn sync_countries(&self) -> Result<SyncReport> {
        info!("Syncing countries");
        let countries = fetch_all_countries(self.source(), &self.config().rest_countries_url).await?;

        let mut report = SyncReport::default();
        let mut tx = self.database().begin().await?;
        for country in &countries {
            if country.cca3.trim().is_empty() {
                debug!("Skipping country without ISO code: {}", country.name.common);
                report.skip();
                continue;
            }
            let outcome = upsert(&mut tx, &NewCountry::from(country)).await?;
            report.record(&outcome);
        }
        tx.commit().await?;

        info!("Countries: {}", report);
        Ok(report)
    }
}
