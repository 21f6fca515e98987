//! Flight tracks built from full telemetry exports.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::models::parse_instant;
use crate::spatial::haversine_distance;

/// One telemetry frame as exported by SondeHub. Other fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryEntry {
    pub datetime: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    #[serde(default)]
    pub serial: Option<String>,
    /// Amateur payloads carry a callsign instead of a serial
    #[serde(default)]
    pub payload_callsign: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

/// A whole flight, de-duplicated and in time order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightTrack {
    pub serial: String,
    pub last_time: DateTime<Utc>,
    pub path: Vec<TrackPoint>,
}

impl FlightTrack {
    /// Build a track from raw frames.
    ///
    /// Frames sharing a timestamp collapse to the last one seen.
    pub fn from_entries(
        entries: Vec<TelemetryEntry>,
        fallback_serial: &str,
    ) -> Result<Self, TrackError> {
        let mut by_time: BTreeMap<DateTime<Utc>, TelemetryEntry> = BTreeMap::new();
        for entry in entries {
            let time = parse_instant(&entry.datetime)
                .map_err(|_| TrackError::BadTimestamp(entry.datetime.clone()))?;
            by_time.insert(time, entry);
        }

        let (first, last_time) = match (by_time.values().next(), by_time.keys().next_back()) {
            (Some(first), Some(last_time)) => (first, *last_time),
            _ => return Err(TrackError::Empty),
        };

        let serial = first
            .serial
            .clone()
            .or_else(|| first.payload_callsign.clone())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| fallback_serial.to_string());

        let path = by_time
            .values()
            .map(|e| TrackPoint {
                lat: e.lat,
                lon: e.lon,
                altitude_m: e.alt,
            })
            .collect();

        Ok(Self {
            serial,
            last_time,
            path,
        })
    }

    /// Final position of the flight.
    pub fn landing(&self) -> Option<&TrackPoint> {
        self.path.last()
    }

    /// Surface distance between the first and last fix, in meters.
    pub fn drift_m(&self) -> f64 {
        match (self.path.first(), self.path.last()) {
            (Some(first), Some(last)) => {
                haversine_distance(first.lat, first.lon, last.lat, last.lon)
            }
            _ => 0.0,
        }
    }
}

/// Parse a per-serial telemetry export (a JSON array of frames).
pub fn parse_track(json: &str, fallback_serial: &str) -> Result<FlightTrack, TrackError> {
    let entries: Vec<TelemetryEntry> = serde_json::from_str(json)?;
    FlightTrack::from_entries(entries, fallback_serial)
}

/// Load a telemetry export from disk. The file stem is the fallback serial.
pub fn load_track_file(path: &Path) -> Result<FlightTrack, TrackError> {
    let contents = fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_track(&contents, &stem)
}

/// Parse an amateur payload export: `{callsign: {frame_key: frame}}`.
///
/// Each callsign converts independently so one bad flight does not lose the rest.
pub fn parse_amateur_export(
    json: &str,
) -> Result<Vec<(String, Result<FlightTrack, TrackError>)>, TrackError> {
    let export: BTreeMap<String, BTreeMap<String, TelemetryEntry>> = serde_json::from_str(json)?;

    Ok(export
        .into_iter()
        .map(|(callsign, frames)| {
            let track = FlightTrack::from_entries(frames.into_values().collect(), &callsign);
            (callsign, track)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_sorted_and_deduplicated() {
        let json = r#"[
            {"datetime": "2024-04-08T18:00:02.000Z", "lat": 2.0, "lon": 20.0, "alt": 200.0,
             "serial": "S9"},
            {"datetime": "2024-04-08T18:00:00.000Z", "lat": 0.0, "lon": 10.0, "alt": 100.0,
             "serial": "S9"},
            {"datetime": "2024-04-08T18:00:01.000Z", "lat": 1.0, "lon": 15.0, "alt": 150.0,
             "serial": "S9"},
            {"datetime": "2024-04-08T18:00:02.000Z", "lat": 2.5, "lon": 20.5, "alt": 250.0,
             "serial": "S9"}
        ]"#;
        let track = parse_track(json, "fallback").unwrap();

        assert_eq!(track.serial, "S9");
        assert_eq!(track.path.len(), 3);
        assert_eq!(track.path[0].lat, 0.0);
        assert_eq!(track.landing().unwrap().altitude_m, 250.0);
        assert_eq!(track.last_time, parse_instant("2024-04-08T18:00:02Z").unwrap());
    }

    #[test]
    fn drift_runs_from_first_to_last_fix() {
        let json = r#"[
            {"datetime": "2024-04-08T18:00:00Z", "lat": 0.0, "lon": 0.0, "alt": 100.0},
            {"datetime": "2024-04-08T18:30:00Z", "lat": 0.5, "lon": 0.0, "alt": 30000.0},
            {"datetime": "2024-04-08T19:00:00Z", "lat": 1.0, "lon": 0.0, "alt": 200.0}
        ]"#;
        let track = parse_track(json, "S1").unwrap();
        assert!((track.drift_m() - 111_089.6).abs() < 1.0, "drift {}", track.drift_m());

        let single =
            r#"[{"datetime": "2024-04-08T18:00:00Z", "lat": 5.0, "lon": 5.0, "alt": 0.0}]"#;
        assert_eq!(parse_track(single, "S2").unwrap().drift_m(), 0.0);
    }

    #[test]
    fn empty_export_is_an_error() {
        assert!(matches!(parse_track("[]", "x"), Err(TrackError::Empty)));
    }

    #[test]
    fn bad_frame_time_is_an_error() {
        let json = r#"[{"datetime": "??", "lat": 0.0, "lon": 0.0, "alt": 0.0}]"#;
        assert!(matches!(parse_track(json, "x"), Err(TrackError::BadTimestamp(_))));
    }

    #[test]
    fn amateur_export_uses_callsigns() {
        let json = r#"{
            "VK5ABC": {
                "a": {"datetime": "2024-04-08T18:00:00Z", "lat": -34.0, "lon": 138.0, "alt": 50.0,
                      "payload_callsign": "VK5ABC-11"},
                "b": {"datetime": "2024-04-08T18:30:00Z", "lat": -34.1, "lon": 138.2, "alt": 9000.0,
                      "payload_callsign": "VK5ABC-11"}
            },
            "BROKEN": {}
        }"#;
        let tracks = parse_amateur_export(json).unwrap();
        assert_eq!(tracks.len(), 2);

        let (name, broken) = &tracks[0];
        assert_eq!(name, "BROKEN");
        assert!(broken.is_err());

        let (_, good) = &tracks[1];
        let good = good.as_ref().unwrap();
        assert_eq!(good.serial, "VK5ABC-11");
        assert_eq!(good.path.len(), 2);
    }
}
