use crate::data_sync::crosswalk::TeamCrosswalk;
use crate::data_sync::telemetry::TeamEntry;

/// What the secondary sources know about a constructor. `None` fields leave stored data alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamProfile {
    pub main_color: Option<String>,
    pub team_manager: Option<String>,
    pub engine_constructor: Option<String>,
    pub is_engine_constructor: Option<bool>,
}

/// `3671C6`, `#3671c6` and `3671c6ff` all become `#3671C6`.
pub fn normalize_color(raw: &str) -> Option<String> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let hex = if hex.len() == 8 { &hex[..6] } else { hex };
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", hex.to_ascii_uppercase()))
}

/// Crosswalk entry first, then a case-insensitive substring match in either direction. First hit wins.
pub fn match_entry<'a>(crosswalk: &TeamCrosswalk, team_name: &str, entries: &'a [TeamEntry]) -> Option<&'a TeamEntry> {
    if let Some(telemetry_name) = crosswalk.telemetry_name(team_name) {
        if let Some(entry) = entries
            .iter()
            .find(|e| e.team_name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(telemetry_name)))
        {
            return Some(entry);
        }
    }

    let wanted = team_name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    entries.iter().find(|e| match e.team_name.as_deref() {
        Some(name) if !name.trim().is_empty() => {
            let name = name.trim().to_lowercase();
            name.contains(&wanted) || wanted.contains(&name)
        }
        _ => false,
    })
}

/// Merge telemetry branding with crosswalk overrides.
pub fn build_profile(crosswalk: &TeamCrosswalk, team_name: &str, entries: &[TeamEntry]) -> TeamProfile {
    let telemetry_color = match_entry(crosswalk, team_name, entries)
        .and_then(|e| e.team_colour.as_deref())
        .and_then(normalize_color);

    match crosswalk.entry(team_name) {
        Some(entry) => TeamProfile {
            main_color: entry.main_color.as_deref().and_then(normalize_color).or(telemetry_color),
            team_manager: entry.team_manager.clone(),
            engine_constructor: entry.engine_constructor.clone(),
            is_engine_constructor: entry.is_engine_constructor,
        },
        None => TeamProfile { main_color: telemetry_color, ..Default::default() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sync::crosswalk::TeamCrosswalkEntry;

    fn entry(team: &str, colour: &str) -> TeamEntry {
        TeamEntry { team_name: Some(team.to_string()), team_colour: Some(colour.to_string()), full_name: None }
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("3671C6").as_deref(), Some("#3671C6"));
        assert_eq!(normalize_color("#27f4d2").as_deref(), Some("#27F4D2"));
        assert_eq!(normalize_color("27f4d2ff").as_deref(), Some("#27F4D2"));
        assert!(normalize_color("blue").is_none());
        assert!(normalize_color("").is_none());
    }

    #[test]
    fn test_substring_match_both_ways() {
        let entries = vec![entry("Red Bull Racing", "3671C6"), entry("Mercedes", "27F4D2")];
        let crosswalk = TeamCrosswalk::default();

        assert_eq!(match_entry(&crosswalk, "Red Bull", &entries).and_then(|e| e.team_colour.as_deref()), Some("3671C6"));
        assert_eq!(match_entry(&crosswalk, "Mercedes-AMG Mercedes", &entries).and_then(|e| e.team_colour.as_deref()), Some("27F4D2"));
        assert!(match_entry(&crosswalk, "Ferrari", &entries).is_none());
    }

    #[test]
    fn test_crosswalk_wins_over_substring() {
        // "Alpine F1 Team" would not substring-match "BWT Alpine"
        let entries = vec![entry("BWT Alpine", "2293D1"), entry("Alpine Renault", "000000")];
        let crosswalk = TeamCrosswalk::new(vec![TeamCrosswalkEntry {
            name: "Alpine F1 Team".to_string(),
            telemetry_name: Some("BWT Alpine".to_string()),
            team_manager: Some("Bruno Famin".to_string()),
            engine_constructor: None,
            is_engine_constructor: Some(true),
            main_color: None,
        }]);

        let profile = build_profile(&crosswalk, "Alpine F1 Team", &entries);
        assert_eq!(profile.main_color.as_deref(), Some("#2293D1"));
        assert_eq!(profile.team_manager.as_deref(), Some("Bruno Famin"));
        assert_eq!(profile.is_engine_constructor, Some(true));
    }

    #[test]
    fn test_no_match_leaves_profile_empty() {
        let profile = build_profile(&TeamCrosswalk::default(), "Haas F1 Team", &[]);
        assert_eq!(profile, TeamProfile::default());
    }
}
