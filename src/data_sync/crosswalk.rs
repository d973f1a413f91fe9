use crate::utils::config_loader::{ConfigSectionLoader, LoadConfigError, load_from_file};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Deserialize, Debug, Default)]
pub struct CrosswalkConfigRoot {
    #[serde(default)]
    pub teams: Vec<TeamCrosswalkEntry>,
}

/// Explicit mapping of one constructor to the telemetry API and to data neither API carries.
#[derive(Clone, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct TeamCrosswalkEntry {
    /// Constructor name as the results API spells it
    pub name: String,
    /// Team name as the telemetry API spells it
    pub telemetry_name: Option<String>,
    pub team_manager: Option<String>,
    pub engine_constructor: Option<String>,
    pub is_engine_constructor: Option<bool>,
    pub main_color: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct TeamCrosswalk {
    entries: Vec<TeamCrosswalkEntry>,
}

impl TeamCrosswalk {
    pub fn new(entries: Vec<TeamCrosswalkEntry>) -> Self {
        Self { entries }
    }

    pub fn entry(&self, team_name: &str) -> Option<&TeamCrosswalkEntry> {
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(team_name))
    }

    pub fn telemetry_name(&self, team_name: &str) -> Option<&str> {
        self.entry(team_name)?.telemetry_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ConfigSectionLoader for TeamCrosswalk {
    type SectionType = TeamCrosswalk;

    async fn load_section_from_file(file_name: &Path) -> Result<Self::SectionType, LoadConfigError> {
        let root: CrosswalkConfigRoot = load_from_file(file_name).await?;
        Ok(TeamCrosswalk::new(root.teams))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config_loader::parse_toml;

    const CROSSWALK: &str = r##"
[[teams]]
name = "Red Bull"
telemetry_name = "Red Bull Racing"
team_manager = "Christian Horner"
is_engine_constructor = false
engine_constructor = "Honda RBPT"

[[teams]]
name = "Alpine F1 Team"
telemetry_name = "Alpine"
main_color = "#2293D1"
"##;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let root: CrosswalkConfigRoot = parse_toml(CROSSWALK).unwrap();
        let crosswalk = TeamCrosswalk::new(root.teams);

        assert_eq!(crosswalk.len(), 2);
        assert_eq!(crosswalk.telemetry_name("red bull"), Some("Red Bull Racing"));
        assert_eq!(crosswalk.entry("Alpine F1 Team").and_then(|e| e.main_color.as_deref()), Some("#2293D1"));
        assert!(crosswalk.entry("Ferrari").is_none());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = parse_toml::<CrosswalkConfigRoot>("[[teams]]\nname = \"McLaren\"\nboss = \"Zak\"");
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_load_section_from_file() {
        let path = std::env::temp_dir().join(format!("tracker-sync-crosswalk-{}.toml", std::process::id()));
        tokio::fs::write(&path, CROSSWALK).await.unwrap();

        let crosswalk = TeamCrosswalk::load_section_from_file(&path).await.unwrap();
        assert_eq!(crosswalk.entry("Red Bull").and_then(|e| e.team_manager.as_deref()), Some("Christian Horner"));

        let _ = tokio::fs::remove_file(&path).await;
    }
}
