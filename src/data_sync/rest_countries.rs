use crate::data_sync::source::JsonSource;
use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::collections::HashMap;

const FIELDS: &str = "name,cca3,flags,altSpellings,timezones,demonyms";

#[derive(Debug, Clone, Deserialize)]
pub struct CountryName {
    pub common: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryFlags {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Demonym {
    #[serde(default)]
    pub f: Option<String>,
    #[serde(default)]
    pub m: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestCountry {
    pub name: CountryName,
    pub cca3: String,
    #[serde(default)]
    pub flags: CountryFlags,
    #[serde(default)]
    pub alt_spellings: Vec<String>,
    #[serde(default)]
    pub timezones: Vec<String>,
    #[serde(default)]
    pub demonyms: HashMap<String, Demonym>,
}

impl RestCountry {
    pub fn flag_url(&self) -> Option<&str> {
        self.flags.png.as_deref().or(self.flags.svg.as_deref())
    }

    pub fn first_timezone(&self) -> Option<&str> {
        self.timezones.first().map(String::as_str)
    }

    /// Alternate spellings stored comma-joined, as the country-by-name resolver expects them.
    pub fn joined_alt_spellings(&self) -> Option<String> {
        (!self.alt_spellings.is_empty()).then(|| self.alt_spellings.join(", "))
    }

    fn english_demonym(&self) -> Option<&Demonym> {
        self.demonyms.get("eng")
    }

    pub fn female_demonym(&self) -> Option<&str> {
        self.english_demonym()?.f.as_deref()
    }

    pub fn male_demonym(&self) -> Option<&str> {
        self.english_demonym()?.m.as_deref()
    }
}

pub fn all_countries_url(base_url: &str) -> String {
    format!("{}/all?fields={}", base_url.trim_end_matches('/'), FIELDS)
}

/// The country API is not paginated: one request returns every country.
pub async fn fetch_all_countries(source: &dyn JsonSource, base_url: &str) -> Result<Vec<RestCountry>> {
    let url = all_countries_url(base_url);
    let body = source.get_json(&url).await?;
    serde_json::from_value(body).map_err(|e| SyncError::payload(&url, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StaticSource, rest_country};

    #[tokio::test]
    async fn test_fetch_and_accessors() {
        let source = StaticSource::new().with(
            &all_countries_url("https://countries.test/v3.1"),
            serde_json::json!([rest_country("GBR", "United Kingdom", "British", &["GB", "UK", "Great Britain"])]),
        );

        let countries = fetch_all_countries(&source, "https://countries.test/v3.1/").await.unwrap();
        assert_eq!(countries.len(), 1);

        let uk = &countries[0];
        assert_eq!(uk.cca3, "GBR");
        assert_eq!(uk.male_demonym(), Some("British"));
        assert_eq!(uk.joined_alt_spellings().as_deref(), Some("GB, UK, Great Britain"));
        assert_eq!(uk.first_timezone(), Some("UTC"));
        assert_eq!(uk.flag_url(), Some("https://flagcdn.com/w320/gb.png"));
    }

    #[test]
    fn test_missing_optional_blocks() {
        let raw = serde_json::json!({"name": {"common": "Antarctica"}, "cca3": "ATA"});
        let country: RestCountry = serde_json::from_value(raw).unwrap();
        assert!(country.male_demonym().is_none());
        assert!(country.joined_alt_spellings().is_none());
        assert!(country.flag_url().is_none());
    }
}
