//! Loading of per-sonde summary files from the archive.
//!
//! A summary file holds three telemetry entries for one sonde: first seen,
//! highest, and last seen. The archive writes them as a JSON array in that
//! order; hand-edited files may use an object keyed by slot name instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::RecordError;
use crate::models::{parse_instant, Slot, Snapshot, SondeRecord, SummarySlots};

/// Telemetry entry as written in a summary file. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    alt: Option<f64>,
    #[serde(default)]
    serial: Option<String>,
}

/// Result of loading a summary directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<SondeRecord>,
    /// Files that were skipped as unusable
    pub skipped: Vec<PathBuf>,
}

/// Parse one summary document.
///
/// # Arguments
/// * `json` - File contents
/// * `fallback_serial` - Used when no entry carries a serial (usually the file stem)
pub fn parse_summary(json: &str, fallback_serial: &str) -> Result<SondeRecord, RecordError> {
    let document: Value = serde_json::from_str(json)?;

    let mut entries: Vec<(Slot, Value)> = Vec::new();
    match document {
        Value::Array(items) => {
            if items.len() != Slot::ALL.len() {
                return Err(RecordError::BadSlotCount(items.len()));
            }
            for (slot, item) in Slot::ALL.into_iter().zip(items) {
                if !item.is_null() {
                    entries.push((slot, item));
                }
            }
        }
        Value::Object(map) => {
            let mut named: Vec<Slot> = Vec::new();
            for (key, item) in map {
                let Some(slot) = Slot::parse(&key) else {
                    tracing::debug!("Ignoring unknown summary key '{}'", key);
                    continue;
                };
                // "first" and "launch" both name the launch slot; only one may appear.
                if named.contains(&slot) {
                    return Err(RecordError::DuplicateSlot {
                        slot: slot.to_string(),
                        key,
                    });
                }
                named.push(slot);
                if !item.is_null() {
                    entries.push((slot, item));
                }
            }
        }
        _ => return Err(RecordError::BadLayout),
    }

    let mut slots = SummarySlots::default();
    let mut serial: Option<String> = None;

    // Walk slots in flight order so the serial comes from the earliest entry.
    entries.sort_by_key(|(slot, _)| Slot::ALL.iter().position(|s| s == slot));
    for (slot, item) in entries {
        let raw: RawEntry = serde_json::from_value(item)?;
        let snapshot = to_snapshot(slot, raw, fallback_serial)?;
        if serial.is_none() {
            serial = Some(snapshot.serial.clone());
        }
        slots.set(slot, snapshot);
    }

    let serial = serial.unwrap_or_else(|| fallback_serial.to_string());
    SondeRecord::new(serial, slots)
}

fn to_snapshot(slot: Slot, raw: RawEntry, fallback_serial: &str) -> Result<Snapshot, RecordError> {
    let slot_name = slot.as_str().to_string();

    let datetime = raw.datetime.ok_or_else(|| RecordError::MissingField {
        slot: slot_name.clone(),
        field: "datetime",
    })?;
    let timestamp = parse_instant(&datetime).map_err(|_| RecordError::BadTimestamp {
        slot: slot_name.clone(),
        value: datetime.clone(),
    })?;

    let lat = require_finite(&slot_name, "lat", raw.lat)?;
    let lon = require_finite(&slot_name, "lon", raw.lon)?;
    let altitude_m = require_finite(&slot_name, "alt", raw.alt)?;

    let serial = raw
        .serial
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback_serial.to_string());

    Ok(Snapshot {
        serial,
        timestamp,
        lat,
        lon,
        altitude_m,
    })
}

fn require_finite(slot: &str, field: &'static str, value: Option<f64>) -> Result<f64, RecordError> {
    let value = value.ok_or_else(|| RecordError::MissingField {
        slot: slot.to_string(),
        field,
    })?;
    if !value.is_finite() {
        return Err(RecordError::NonFinite {
            slot: slot.to_string(),
            field,
        });
    }
    Ok(value)
}

/// Load a single summary file. The file stem is the fallback serial.
pub fn load_summary_file(path: &Path) -> Result<SondeRecord, RecordError> {
    let contents = fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_summary(&contents, &stem)
}

/// Load every `*.json` summary in `dir`, in file-name order.
///
/// Unreadable or malformed files are logged and skipped. Only a failure to
/// list the directory itself is returned as an error.
pub fn load_summary_dir(dir: &Path) -> io::Result<LoadReport> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    tracing::info!("Working on {} summary files in {}", paths.len(), dir.display());

    let mut report = LoadReport::default();
    for path in paths {
        tracing::debug!("Loading {}", path.display());
        match load_summary_file(&path) {
            Ok(record) => report.records.push(record),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                report.skipped.push(path);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARCHIVE_SUMMARY: &str = r#"[
        {"datetime": "2024-04-08T17:05:12.000000Z", "lat": 36.9, "lon": -90.1, "alt": 120.5,
         "serial": "22059930", "frequency": 403.0, "type": "RS41"},
        {"datetime": "2024-04-08T18:12:24.000000Z", "lat": 36.37851, "lon": -90.69866,
         "alt": 20000.0, "serial": "22059930"},
        {"datetime": "2024-04-08T19:02:40.500000Z", "lat": 36.1, "lon": -91.0, "alt": 310.0,
         "serial": "22059930"}
    ]"#;

    #[test]
    fn parses_archive_array_layout() {
        let record = parse_summary(ARCHIVE_SUMMARY, "ignored").unwrap();
        assert_eq!(record.serial(), "22059930");
        assert_eq!(record.slots().len(), 3);

        let burst = record.slots().burst.as_ref().unwrap();
        assert_eq!(burst.altitude_m, 20000.0);
        assert_eq!(burst.timestamp, parse_instant("2024-04-08T18:12:24Z").unwrap());
    }

    #[test]
    fn parses_named_slot_layout() {
        let json = r#"{
            "last": {"datetime": "2024-04-08T19:00:00Z", "lat": 36.0, "lon": -91.0, "alt": 300.0},
            "first": {"datetime": "2024-04-08T17:00:00Z", "lat": 37.0, "lon": -90.0, "alt": 100.0}
        }"#;
        let record = parse_summary(json, "T1234567").unwrap();
        assert_eq!(record.serial(), "T1234567");
        assert!(record.slots().burst.is_none());
        assert_eq!(record.slots().launch.as_ref().unwrap().lat, 37.0);
    }

    #[test]
    fn repeated_slot_alias_rejects_record() {
        let json = r#"{
            "first": {"datetime": "2024-04-08T17:00:00Z", "lat": 37.0, "lon": -90.0, "alt": 100.0},
            "launch": {"datetime": "2024-04-08T17:01:00Z", "lat": 37.1, "lon": -90.0, "alt": 400.0}
        }"#;
        let err = parse_summary(json, "x").unwrap_err();
        assert!(matches!(err, RecordError::DuplicateSlot { ref slot, .. } if slot == "launch"));
    }

    #[test]
    fn unparsable_timestamp_rejects_record() {
        let json = ARCHIVE_SUMMARY.replace("2024-04-08T18:12:24.000000Z", "not-a-time");
        let err = parse_summary(&json, "x").unwrap_err();
        assert!(matches!(err, RecordError::BadTimestamp { .. }));
    }

    #[test]
    fn missing_coordinate_rejects_record() {
        let json = r#"{"burst": {"datetime": "2024-04-08T18:00:00Z", "lat": 36.0, "alt": 300.0}}"#;
        let err = parse_summary(json, "x").unwrap_err();
        assert!(matches!(err, RecordError::MissingField { field: "lon", .. }));
    }

    #[test]
    fn wrong_entry_count_is_rejected() {
        let json = r#"[{"datetime": "2024-04-08T18:00:00Z", "lat": 1.0, "lon": 1.0, "alt": 1.0}]"#;
        assert!(matches!(
            parse_summary(json, "x").unwrap_err(),
            RecordError::BadSlotCount(1)
        ));
    }

    #[test]
    fn document_without_slots_is_empty() {
        let json = r#"{"lat": 1.0, "lon": 2.0}"#;
        assert!(matches!(parse_summary(json, "x").unwrap_err(), RecordError::Empty));
        assert!(matches!(parse_summary("42", "x").unwrap_err(), RecordError::BadLayout));
        assert!(matches!(parse_summary("{", "x").unwrap_err(), RecordError::Json(_)));
    }
}
