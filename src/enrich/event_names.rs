use crate::data_sync::telemetry::Meeting;

/// Events the two APIs name differently, results API name first.
const KNOWN_RENAMES: &[(&str, &str)] = &[
    ("Mexican Grand Prix", "Mexico City Grand Prix"),
    ("Brazilian Grand Prix", "São Paulo Grand Prix"),
];

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        '-' | '_' => ' ',
        c => c,
    }
}

/// Lowercase, accent-free, single-spaced, with `grand prix` shortened to `gp`.
pub fn canonical(name: &str) -> String {
    let folded: String = name.to_lowercase().chars().map(fold_char).collect();
    let mut words: Vec<&str> = folded.split_whitespace().collect();

    if words.ends_with(&["grand", "prix"]) {
        words.truncate(words.len() - 2);
        words.push("gp");
    }
    words.join(" ")
}

/// Telemetry-side name of an event, when the table knows a rename.
pub fn renamed(name: &str) -> Option<&'static str> {
    let key = canonical(name);
    KNOWN_RENAMES.iter().find(|(results_name, _)| canonical(results_name) == key).map(|(_, telemetry_name)| *telemetry_name)
}

pub fn names_match(results_name: &str, telemetry_name: &str) -> bool {
    let target = canonical(telemetry_name);
    canonical(results_name) == target || renamed(results_name).is_some_and(|r| canonical(r) == target)
}

pub fn find_meeting<'a>(meetings: &'a [Meeting], event_name: &str) -> Option<&'a Meeting> {
    meetings.iter().find(|m| names_match(event_name, &m.meeting_name))
}
