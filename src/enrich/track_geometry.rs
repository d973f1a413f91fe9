use crate::data_sync::telemetry::CircuitLayout;
use ahash::AHashSet;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Corner {
    pub number: i64,
    pub letter: String,
    pub angle: f64,
    pub distance: f64,
    pub x: f64,
    pub y: f64,
}

/// Layout-derived track fields, ready to be stored as JSON text.
#[derive(Debug, Clone)]
pub struct TrackGeometry {
    pub turns_number: i64,
    pub timezone: Option<String>,
    pub geojson: Value,
    pub corners: Vec<Corner>,
}

impl TrackGeometry {
    /// Coordinates are rotated by the layout's display rotation so north points up.
    pub fn from_layout(layout: &CircuitLayout, gmt_offset: Option<&str>) -> Option<Self> {
        if layout.x.is_empty() || layout.x.len() != layout.y.len() {
            return None;
        }

        let (sin, cos) = layout.rotation.to_radians().sin_cos();
        let rotate = |x: f64, y: f64| (x * cos - y * sin, x * sin + y * cos);

        let mut line: Vec<[f64; 2]> = layout
            .x
            .iter()
            .zip(&layout.y)
            .map(|(&x, &y)| {
                let (rx, ry) = rotate(x, y);
                [rx, ry]
            })
            .collect();
        if let (Some(first), Some(last)) = (line.first().copied(), line.last().copied()) {
            if first != last {
                line.push(first);
            }
        }

        let corners: Vec<Corner> = layout
            .corners
            .iter()
            .map(|c| {
                let (x, y) = rotate(c.track_position.x, c.track_position.y);
                Corner { number: c.number, letter: c.letter.clone(), angle: c.angle, distance: c.length, x, y }
            })
            .collect();

        let turns_number = corners.iter().map(|c| c.number).collect::<AHashSet<_>>().len() as i64;

        let geojson = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": layout.circuit_name},
                "geometry": {"type": "LineString", "coordinates": line}
            }]
        });

        Some(Self { turns_number, timezone: gmt_offset.and_then(utc_offset_label), geojson, corners })
    }

    pub fn geojson_text(&self) -> String {
        self.geojson.to_string()
    }

    pub fn corners_text(&self) -> String {
        serde_json::to_string(&self.corners).unwrap_or_else(|_| "[]".to_string())
    }
}

/// `03:00:00` becomes `UTC+03:00`, `-05:00:00` becomes `UTC-05:00`, a zero offset plain `UTC`.
pub fn utc_offset_label(gmt_offset: &str) -> Option<String> {
    let raw = gmt_offset.trim();
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(rest) => ('-', rest),
        None => ('+', raw.strip_prefix('+').unwrap_or(raw)),
    };

    let mut parts = rest.split(':');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next().unwrap_or("0").parse().ok()?;
    if hours > 14 || minutes >= 60 {
        return None;
    }

    if hours == 0 && minutes == 0 {
        return Some("UTC".to_string());
    }
    Some(format!("UTC{}{:02}:{:02}", sign, hours, minutes))
}
