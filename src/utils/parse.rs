use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a lap or stop duration such as `1:31.447` or `22.552` into seconds.
pub fn parse_lap_time(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let mut total = 0.0;
    for part in raw.split(':') {
        let value: f64 = part.parse().ok()?;
        total = total * 60.0 + value;
    }
    Some(total)
}

/// `2023-03-05`
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// `15:00:00Z` or `15:00:00`
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim().trim_end_matches('Z'), "%H:%M:%S").ok()
}

/// Combine a date with an optional time of day; a missing or malformed time means midnight UTC.
pub fn parse_date_time(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = parse_date(date)?;
    let time = time.and_then(parse_time).unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

pub fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

/// Treat empty strings and literal `null` from APIs as absent.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        .map(str::to_string)
}
