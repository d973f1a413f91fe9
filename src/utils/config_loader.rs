use async_trait::async_trait;
use dotenvy::dotenv;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::env;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([a-zA-Z_][0-9a-zA-Z_]*)\}").expect("env var pattern is valid"));

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// A named section of a TOML config file.
#[async_trait]
pub trait ConfigSectionLoader {
    type SectionType;

    async fn load_section_from_file(file_name: &Path) -> Result<Self::SectionType, LoadConfigError>;
}

pub async fn load_from_file<T: DeserializeOwned>(file_name: &Path) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let contents = tokio::fs::read_to_string(file_name).await?;
    parse_toml(&contents)
}

/// Parse TOML after substituting `${VAR}` references from the environment.
pub fn parse_toml<T: DeserializeOwned>(contents: &str) -> Result<T, LoadConfigError> {
    let contents = expand_vars(contents, |name| env::var(name).ok());
    Ok(toml::from_str(&contents)?)
}

/// Unknown variables are left in place.
pub fn expand_vars(raw_config: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    ENV_VAR_PATTERN
        .replace_all(raw_config, |caps: &Captures| match lookup(&caps[1]) {
            Some(val) => val,
            None => caps[0].to_string(),
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_and_unknown_vars() {
        let raw = "manager = \"${TEAM_BOSS}\"\ncolor = \"${NOT_SET}\"";
        let expanded = expand_vars(raw, |name| (name == "TEAM_BOSS").then(|| "Toto Wolff".to_string()));
        assert_eq!(expanded, "manager = \"Toto Wolff\"\ncolor = \"${NOT_SET}\"");
    }

    #[test]
    fn test_parse_toml_error() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Section {
            name: String,
        }
        let err = parse_toml::<Section>("name = ").unwrap_err();
        assert!(matches!(err, LoadConfigError::TomlError(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let path = std::env::temp_dir().join("tracker-sync-does-not-exist.toml");
        let err = load_from_file::<toml::Value>(&path).await.unwrap_err();
        assert!(matches!(err, LoadConfigError::IoError(_)));
    }
}
